// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::engine::effects::{apply_transaction_delete, apply_transaction_write, Touched};
use crate::engine::{evaluate_open_balance_update, evaluate_transaction_write, AnchorDay, Verdict};
use crate::models::{
    Category, Debt, FlowType, Goal, Snapshot, Transaction, TransactionDraft, TxnKind,
};
use crate::utils::{parse_date, parse_decimal};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Koinfo", "koinfo"));

pub const DB_ENV: &str = "KOINFO_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("koinfo.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    seed_defaults(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','saving')),
        deleted INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        category_id TEXT NOT NULL,
        note TEXT,
        use_open_balance INTEGER NOT NULL DEFAULT 0,
        debt_claim INTEGER NOT NULL DEFAULT 0,
        goal_withdrawal INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS debts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        balance TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('payable','receivable')),
        linked_category_id TEXT,
        FOREIGN KEY(linked_category_id) REFERENCES categories(id)
    );

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        target TEXT NOT NULL,
        current TEXT NOT NULL DEFAULT '0',
        deadline TEXT NOT NULL,
        created TEXT NOT NULL,
        completed_at TEXT,
        linked_category_id TEXT,
        FOREIGN KEY(linked_category_id) REFERENCES categories(id)
    );
    "#,
    )?;
    Ok(())
}

/// Starting categories for an empty database.
pub fn default_categories() -> Vec<Category> {
    [
        ("Salary", FlowType::Income),
        ("Groceries", FlowType::Expense),
        ("Investments", FlowType::Saving),
    ]
    .into_iter()
    .map(|(name, t)| Category {
        id: new_id(),
        name: name.to_string(),
        r#type: t,
        deleted: false,
    })
    .collect()
}

pub fn seed_defaults(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if count == 0 {
        for c in default_categories() {
            insert_category(conn, &c)?;
        }
    }
    Ok(())
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// Settings
fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_anchor_day(conn: &Connection) -> Result<AnchorDay> {
    match get_setting(conn, "cycle_anchor_day")? {
        Some(s) => {
            let day: u32 = s
                .trim()
                .parse()
                .with_context(|| format!("Invalid stored anchor day '{}'", s))?;
            Ok(AnchorDay::new(day)?)
        }
        None => Ok(AnchorDay::default()),
    }
}

pub fn set_anchor_day(conn: &Connection, anchor: AnchorDay) -> Result<()> {
    set_setting(conn, "cycle_anchor_day", &anchor.to_string())
}

pub fn get_open_balance(conn: &Connection) -> Result<Decimal> {
    match get_setting(conn, "open_balance")? {
        Some(s) => parse_decimal(&s),
        None => Ok(Decimal::ZERO),
    }
}

fn set_open_balance(conn: &Connection, value: Decimal) -> Result<()> {
    set_setting(conn, "open_balance", &value.to_string())
}

// Snapshot load
fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, type, deleted FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, bool>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, t, deleted) = row?;
        out.push(Category {
            r#type: t.parse()?,
            id,
            name,
            deleted,
        });
    }
    Ok(out)
}

fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, amount, category_id, note, use_open_balance, debt_claim, goal_withdrawal
         FROM transactions ORDER BY date, created_at, id",
    )?;
    let mut cur = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let d: String = r.get(1)?;
        let a: String = r.get(2)?;
        let kind = TxnKind::from_flags(r.get(6)?, r.get(7)?)
            .with_context(|| format!("Stored transaction {} has conflicting flags", id))?;
        out.push(Transaction {
            date: parse_date(&d)?,
            amount: parse_decimal(&a)
                .with_context(|| format!("Invalid amount in transaction {}", id))?,
            category_id: r.get(3)?,
            note: r.get(4)?,
            use_open_balance: r.get(5)?,
            kind,
            id,
        });
    }
    Ok(out)
}

fn load_debts(conn: &Connection) -> Result<Vec<Debt>> {
    let mut stmt =
        conn.prepare("SELECT id, name, balance, kind, linked_category_id FROM debts ORDER BY name")?;
    let mut cur = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let b: String = r.get(2)?;
        let k: String = r.get(3)?;
        out.push(Debt {
            id: r.get(0)?,
            name: r.get(1)?,
            balance: parse_decimal(&b)?,
            kind: k.parse()?,
            linked_category_id: r.get(4)?,
        });
    }
    Ok(out)
}

fn load_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target, current, deadline, created, completed_at, linked_category_id
         FROM goals ORDER BY deadline, name",
    )?;
    let mut cur = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let target: String = r.get(2)?;
        let current: String = r.get(3)?;
        let deadline: String = r.get(4)?;
        let created: String = r.get(5)?;
        let completed: Option<String> = r.get(6)?;
        out.push(Goal {
            id: r.get(0)?,
            name: r.get(1)?,
            target: parse_decimal(&target)?,
            current: parse_decimal(&current)?,
            deadline: parse_date(&deadline)?,
            created: parse_date(&created)?,
            completed_at: completed.as_deref().map(parse_date).transpose()?,
            linked_category_id: r.get(7)?,
        });
    }
    Ok(out)
}

pub fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    Ok(Snapshot {
        categories: load_categories(conn)?,
        transactions: load_transactions(conn)?,
        debts: load_debts(conn)?,
        goals: load_goals(conn)?,
        open_balance: get_open_balance(conn)?,
    })
}

// Row writers
pub fn insert_category(conn: &Connection, c: &Category) -> Result<()> {
    conn.execute(
        "INSERT INTO categories(id, name, type, deleted) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, type=excluded.type, deleted=excluded.deleted",
        params![c.id, c.name, c.r#type.as_str(), c.deleted],
    )?;
    Ok(())
}

pub fn soft_delete_category(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("UPDATE categories SET deleted=1 WHERE id=?1", params![id])?;
    Ok(())
}

pub fn purge_category(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    Ok(())
}

pub fn save_debt(conn: &Connection, d: &Debt) -> Result<()> {
    conn.execute(
        "INSERT INTO debts(id, name, balance, kind, linked_category_id) VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, balance=excluded.balance,
            kind=excluded.kind, linked_category_id=excluded.linked_category_id",
        params![
            d.id,
            d.name,
            d.balance.to_string(),
            d.kind.as_str(),
            d.linked_category_id
        ],
    )?;
    Ok(())
}

pub fn delete_debt(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM debts WHERE id=?1", params![id])?;
    Ok(())
}

pub fn save_goal(conn: &Connection, g: &Goal) -> Result<()> {
    conn.execute(
        "INSERT INTO goals(id, name, target, current, deadline, created, completed_at, linked_category_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, target=excluded.target,
            current=excluded.current, deadline=excluded.deadline, created=excluded.created,
            completed_at=excluded.completed_at, linked_category_id=excluded.linked_category_id",
        params![
            g.id,
            g.name,
            g.target.to_string(),
            g.current.to_string(),
            g.deadline.to_string(),
            g.created.to_string(),
            g.completed_at.map(|d| d.to_string()),
            g.linked_category_id
        ],
    )?;
    Ok(())
}

pub fn delete_goal(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM goals WHERE id=?1", params![id])?;
    Ok(())
}

fn upsert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, date, amount, category_id, note, use_open_balance, debt_claim, goal_withdrawal)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
         ON CONFLICT(id) DO UPDATE SET date=excluded.date, amount=excluded.amount,
            category_id=excluded.category_id, note=excluded.note,
            use_open_balance=excluded.use_open_balance, debt_claim=excluded.debt_claim,
            goal_withdrawal=excluded.goal_withdrawal",
        params![
            t.id,
            t.date.to_string(),
            t.amount.to_string(),
            t.category_id,
            t.note,
            t.use_open_balance,
            t.kind.is_debt_claim(),
            t.kind.is_goal_withdrawal()
        ],
    )?;
    Ok(())
}

fn persist_touched(conn: &Connection, snapshot: &Snapshot, touched: &Touched) -> Result<()> {
    for d in snapshot.debts.iter().filter(|d| touched.debts.contains(&d.id)) {
        save_debt(conn, d)?;
    }
    for g in snapshot.goals.iter().filter(|g| touched.goals.contains(&g.id)) {
        save_goal(conn, g)?;
    }
    Ok(())
}

/// Replace the whole dataset, e.g. on import or reset.
pub fn replace_snapshot(conn: &mut Connection, snapshot: &Snapshot) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(
        "DELETE FROM transactions; DELETE FROM debts; DELETE FROM goals; DELETE FROM categories;",
    )?;
    for c in &snapshot.categories {
        insert_category(&tx, c)?;
    }
    for d in &snapshot.debts {
        save_debt(&tx, d)?;
    }
    for g in &snapshot.goals {
        save_goal(&tx, g)?;
    }
    for t in &snapshot.transactions {
        upsert_transaction(&tx, t)
            .with_context(|| format!("Import transaction {} ({})", t.id, t.category_id))?;
    }
    set_open_balance(&tx, snapshot.open_balance)?;
    tx.commit()?;
    Ok(())
}

/// Result of a guarded write. `transaction` is set only when it was stored.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub verdict: Verdict,
    pub transaction: Option<Transaction>,
}

/// Create (`prior_id = None`) or update a transaction.
///
/// Snapshot read, guard evaluation and the write run inside one immediate
/// SQLite transaction, so concurrent writers cannot both pass the guard on
/// the same remaining balance.
pub fn commit_transaction_write(
    conn: &mut Connection,
    draft: &TransactionDraft,
    prior_id: Option<&str>,
    anchor: AnchorDay,
    today: NaiveDate,
) -> Result<WriteOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut snapshot = load_snapshot(&tx)?;
    let prior = match prior_id {
        Some(id) => Some(
            snapshot
                .transaction(id)
                .cloned()
                .with_context(|| format!("Transaction '{}' not found", id))?,
        ),
        None => None,
    };
    let verdict = evaluate_transaction_write(draft, &snapshot, anchor, today, prior.as_ref())?;
    if let Verdict::Reject(reason) = &verdict {
        warn!(%reason, date = %draft.date, amount = %draft.amount, "transaction write rejected");
        return Ok(WriteOutcome {
            verdict,
            transaction: None,
        });
    }

    let id = prior.as_ref().map(|p| p.id.clone()).unwrap_or_else(new_id);
    let txn = draft.clone().into_transaction(id);
    let touched = apply_transaction_write(&mut snapshot, prior.as_ref(), &txn, today);
    upsert_transaction(&tx, &txn)?;
    persist_touched(&tx, &snapshot, &touched)?;
    tx.commit()?;
    info!(id = %txn.id, date = %txn.date, amount = %txn.amount, "transaction committed");
    Ok(WriteOutcome {
        verdict,
        transaction: Some(txn),
    })
}

pub fn commit_transaction_delete(
    conn: &mut Connection,
    id: &str,
    today: NaiveDate,
) -> Result<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut snapshot = load_snapshot(&tx)?;
    let (txn, touched) = apply_transaction_delete(&mut snapshot, id, today)
        .with_context(|| format!("Transaction '{}' not found", id))?;
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    persist_touched(&tx, &snapshot, &touched)?;
    tx.commit()?;
    info!(id = %txn.id, "transaction deleted");
    Ok(txn)
}

pub fn commit_open_balance(conn: &mut Connection, value: Decimal) -> Result<Verdict> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let snapshot = load_snapshot(&tx)?;
    let verdict = evaluate_open_balance_update(&snapshot, value)?;
    if verdict.is_accepted() {
        set_open_balance(&tx, value)?;
        tx.commit()?;
        info!(%value, "opening balance updated");
    } else {
        warn!(%value, "opening balance update rejected");
    }
    Ok(verdict)
}

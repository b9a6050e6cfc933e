// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Clock;
use crate::db::{commit_transaction_delete, commit_transaction_write, load_snapshot, WriteOutcome};
use crate::engine::classify::classify;
use crate::engine::{cycle_range, Verdict};
use crate::models::{Snapshot, TransactionDraft, TxnKind};
use crate::utils::{
    active_category_by_name, arg, fmt_money, maybe_print_json, opt_arg, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, clock: &Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, clock, sub)?,
        Some(("edit", sub)) => edit(conn, clock, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            let txn = commit_transaction_delete(conn, id, clock.today)?;
            println!("Deleted transaction {} ({} on {})", txn.id, txn.amount, txn.date);
        }
        Some(("list", sub)) => list(conn, clock, sub)?,
        _ => {}
    }
    Ok(())
}

fn category_id_for(snapshot: &Snapshot, name: &str) -> Result<String> {
    if let Some(c) = active_category_by_name(&snapshot.categories, name) {
        return Ok(c.id.clone());
    }
    // Deleted categories still resolve so the engine can refuse them by name.
    snapshot
        .categories
        .iter()
        .find(|c| c.name.trim().eq_ignore_ascii_case(name.trim()))
        .map(|c| c.id.clone())
        .with_context(|| format!("Category '{}' not found", name))
}

fn report(outcome: &WriteOutcome) -> Result<()> {
    match &outcome.verdict {
        Verdict::Reject(reason) => bail!("Rejected: {}", reason),
        Verdict::AcceptWithWarning(notice) => println!("Note: {}", notice),
        Verdict::Accept => {}
    }
    if let Some(t) = &outcome.transaction {
        println!("Recorded {} on {} (id: {})", fmt_money(&t.amount), t.date, t.id);
    }
    Ok(())
}

fn add(conn: &mut Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let draft = TransactionDraft {
        date: parse_date(arg(sub, "date")?)?,
        amount: parse_decimal(arg(sub, "amount")?)?,
        category_id: category_id_for(&snapshot, arg(sub, "category")?)?,
        note: opt_arg(sub, "note").filter(|n| !n.is_empty()).map(str::to_string),
        use_open_balance: sub.get_flag("use-open-balance"),
        kind: match opt_arg(sub, "kind") {
            Some(k) => k.parse()?,
            None => TxnKind::Plain,
        },
    };
    let outcome = commit_transaction_write(conn, &draft, None, clock.anchor, clock.today)?;
    report(&outcome)
}

fn edit(conn: &mut Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?;
    let snapshot = load_snapshot(conn)?;
    let prior = snapshot
        .transaction(id)
        .with_context(|| format!("Transaction '{}' not found", id))?;
    let mut draft = TransactionDraft::from(prior);
    if let Some(d) = opt_arg(sub, "date") {
        draft.date = parse_date(d)?;
    }
    if let Some(a) = opt_arg(sub, "amount") {
        draft.amount = parse_decimal(a)?;
    }
    if let Some(c) = opt_arg(sub, "category") {
        draft.category_id = category_id_for(&snapshot, c)?;
    }
    if let Some(n) = opt_arg(sub, "note") {
        draft.note = Some(n.to_string()).filter(|n| !n.is_empty());
    }
    if let Some(k) = opt_arg(sub, "kind") {
        draft.kind = k.parse()?;
    }
    if sub.get_flag("use-open-balance") {
        draft.use_open_balance = true;
    }
    if sub.get_flag("no-open-balance") {
        draft.use_open_balance = false;
    }
    let outcome = commit_transaction_write(conn, &draft, Some(id), clock.anchor, clock.today)?;
    report(&outcome)
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub category: String,
    pub flow: String,
    pub amount: String,
    pub kind: String,
    pub open_balance: bool,
    pub note: String,
}

pub fn query_rows(
    conn: &Connection,
    clock: &Clock,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let snapshot = load_snapshot(conn)?;
    let index = snapshot.category_index();
    let window = opt_arg(sub, "cycle")
        .map(|d| parse_date(d).map(|d| cycle_range(d, clock.anchor)))
        .transpose()?;

    let mut txns: Vec<_> = snapshot
        .transactions
        .iter()
        .filter(|t| window.is_none_or(|w| w.contains(t.date)))
        .collect();
    txns.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txns.truncate(*limit);
    }

    Ok(txns
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            category: index
                .get(t.category_id.as_str())
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "(unknown)".into()),
            flow: classify(t, &index)
                .map(|f| f.to_string())
                .unwrap_or_default(),
            amount: fmt_money(&t.amount),
            kind: t.kind.as_str().to_string(),
            open_balance: t.use_open_balance,
            note: t.note.clone().unwrap_or_default(),
        })
        .collect())
}

fn list(conn: &Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, clock, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.category.clone(),
                    r.flow.clone(),
                    r.amount.clone(),
                    r.kind.clone(),
                    if r.open_balance { "yes".into() } else { String::new() },
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Category", "Flow", "Amount", "Kind", "Opening", "Note", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

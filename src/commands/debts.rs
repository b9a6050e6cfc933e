// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::categories::sync_linked;
use crate::db::{delete_debt, load_snapshot, new_id, save_debt, soft_delete_category};
use crate::models::{Category, Debt, DebtKind, Snapshot};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let balance = parse_decimal(arg(sub, "balance")?)?;
            let kind: DebtKind = arg(sub, "kind")?.parse()?;
            let (debt, cat) = add(conn, name, balance, kind)?;
            println!(
                "Added {} debt '{}' ({}), linked category '{}'",
                debt.kind.as_str(),
                debt.name,
                fmt_money(&debt.balance),
                cat.name
            );
        }
        Some(("edit", sub)) => {
            let name = arg(sub, "name")?;
            let balance = opt_arg(sub, "balance").map(parse_decimal).transpose()?;
            let kind = opt_arg(sub, "kind").map(str::parse::<DebtKind>).transpose()?;
            let (debt, cat) = edit(conn, name, opt_arg(sub, "rename"), balance, kind)?;
            println!(
                "Updated {} debt '{}' ({}), linked category '{}'",
                debt.kind.as_str(),
                debt.name,
                fmt_money(&debt.balance),
                cat.name
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            remove(conn, name)?;
            println!("Removed debt '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn find<'a>(snapshot: &'a Snapshot, name: &str) -> Result<&'a Debt> {
    snapshot
        .debts
        .iter()
        .find(|d| same_name(&d.name, name))
        .with_context(|| format!("Debt '{}' not found", name))
}

fn linked_base(name: &str) -> String {
    format!("{} - Debt", name)
}

/// Create a debt together with its linked "<name> - Debt" category.
pub fn add(
    conn: &Connection,
    name: &str,
    balance: Decimal,
    kind: DebtKind,
) -> Result<(Debt, Category)> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Debt name required");
    }
    if balance < Decimal::ZERO {
        bail!("Debt balance must not be negative");
    }
    let snapshot = load_snapshot(conn)?;
    if snapshot.debts.iter().any(|d| same_name(&d.name, name)) {
        bail!("Debt '{}' already exists", name);
    }
    let cat = sync_linked(conn, &snapshot, None, &linked_base(name), kind.linked_flow())?;
    let debt = Debt {
        id: new_id(),
        name: name.to_string(),
        balance,
        kind,
        linked_category_id: Some(cat.id.clone()),
    };
    save_debt(conn, &debt)?;
    Ok((debt, cat))
}

/// Change a debt's name, balance or kind. The linked category follows: it is
/// renamed to "<name> - Debt" and takes the flow of the new kind.
pub fn edit(
    conn: &Connection,
    name: &str,
    new_name: Option<&str>,
    balance: Option<Decimal>,
    kind: Option<DebtKind>,
) -> Result<(Debt, Category)> {
    let snapshot = load_snapshot(conn)?;
    let mut debt = find(&snapshot, name)?.clone();
    if let Some(new_name) = new_name {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            bail!("Debt name required");
        }
        let taken = snapshot
            .debts
            .iter()
            .any(|d| d.id != debt.id && same_name(&d.name, new_name));
        if taken {
            bail!("Debt '{}' already exists", new_name);
        }
        debt.name = new_name.to_string();
    }
    if let Some(balance) = balance {
        if balance < Decimal::ZERO {
            bail!("Debt balance must not be negative");
        }
        debt.balance = balance;
    }
    if let Some(kind) = kind {
        debt.kind = kind;
    }
    let cat = sync_linked(
        conn,
        &snapshot,
        debt.linked_category_id.as_deref(),
        &linked_base(&debt.name),
        debt.kind.linked_flow(),
    )?;
    debt.linked_category_id = Some(cat.id.clone());
    save_debt(conn, &debt)?;
    Ok((debt, cat))
}

pub fn remove(conn: &Connection, name: &str) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let debt = find(&snapshot, name)?;
    delete_debt(conn, &debt.id)?;
    if let Some(cat) = &debt.linked_category_id {
        soft_delete_category(conn, cat)?;
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snapshot.debts)? {
        let rows = snapshot
            .debts
            .iter()
            .map(|d| {
                let cat = d
                    .linked_category_id
                    .as_deref()
                    .and_then(|id| snapshot.category(id))
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                vec![
                    d.name.clone(),
                    d.kind.as_str().to_string(),
                    fmt_money(&d.balance),
                    cat,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Debt", "Kind", "Balance", "Category"], rows)
        );
    }
    Ok(())
}

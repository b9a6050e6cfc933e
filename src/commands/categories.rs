// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{insert_category, load_snapshot, new_id, purge_category, soft_delete_category};
use crate::models::{Category, FlowType, Snapshot};
use crate::utils::{
    active_category_by_name, arg, maybe_print_json, opt_arg, pretty_table, unique_name_excluding,
};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let t: FlowType = arg(sub, "type")?.parse()?;
            let c = add(conn, name, t)?;
            println!("Added {} category '{}'", c.r#type, c.name);
        }
        Some(("edit", sub)) => {
            let name = arg(sub, "name")?;
            let t = opt_arg(sub, "type").map(str::parse::<FlowType>).transpose()?;
            let c = edit(conn, name, opt_arg(sub, "rename"), t)?;
            println!("Updated {} category '{}'", c.r#type, c.name);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            if remove(conn, name)? {
                println!("Removed category '{}'", name);
            } else {
                println!("Category '{}' has transactions; marked as deleted", name);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, name: &str, t: FlowType) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Category name required");
    }
    let snapshot = load_snapshot(conn)?;
    if active_category_by_name(&snapshot.categories, name).is_some() {
        bail!("Category '{}' already exists", name);
    }
    let c = Category {
        id: new_id(),
        name: name.to_string(),
        r#type: t,
        deleted: false,
    };
    insert_category(conn, &c)?;
    Ok(c)
}

/// Rename a category or change its type. Linked categories keep the type
/// their debt or goal dictates.
pub fn edit(
    conn: &Connection,
    name: &str,
    new_name: Option<&str>,
    t: Option<FlowType>,
) -> Result<Category> {
    let snapshot = load_snapshot(conn)?;
    let mut c = active_category_by_name(&snapshot.categories, name)
        .with_context(|| format!("Category '{}' not found", name))?
        .clone();
    if let Some(new_name) = new_name {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            bail!("Category name required");
        }
        if unique_name_excluding(&snapshot.categories, new_name, Some(c.id.as_str())) != new_name {
            bail!("Category '{}' already exists", new_name);
        }
        c.name = new_name.to_string();
    }
    if let Some(t) = t {
        if t != c.r#type && snapshot.is_linked(&c.id) {
            bail!("Category '{}' takes its type from its linked debt or goal", c.name);
        }
        c.r#type = t;
    }
    insert_category(conn, &c)?;
    Ok(c)
}

/// Point a debt's or goal's linked category at `base` (made unique) and
/// flow `t`, creating the category when the link is missing.
pub fn sync_linked(
    conn: &Connection,
    snapshot: &Snapshot,
    linked_id: Option<&str>,
    base: &str,
    t: FlowType,
) -> Result<Category> {
    let cat = match linked_id.and_then(|id| snapshot.category(id)) {
        Some(existing) => Category {
            name: unique_name_excluding(&snapshot.categories, base, Some(existing.id.as_str())),
            r#type: t,
            ..existing.clone()
        },
        None => Category {
            id: new_id(),
            name: unique_name_excluding(&snapshot.categories, base, None),
            r#type: t,
            deleted: false,
        },
    };
    insert_category(conn, &cat)?;
    Ok(cat)
}

/// Remove a category. Returns `true` when it was purged, `false` when it was
/// kept as deleted because transactions still reference it.
pub fn remove(conn: &Connection, name: &str) -> Result<bool> {
    let snapshot = load_snapshot(conn)?;
    let c = active_category_by_name(&snapshot.categories, name)
        .with_context(|| format!("Category '{}' not found", name))?;
    if snapshot.is_linked(&c.id) {
        bail!(
            "Category '{}' is linked to a debt or goal and cannot be deleted here",
            c.name
        );
    }
    let in_use = snapshot.transactions.iter().any(|t| t.category_id == c.id);
    if in_use {
        soft_delete_category(conn, &c.id)?;
        Ok(false)
    } else {
        purge_category(conn, &c.id)?;
        Ok(true)
    }
}

#[derive(Serialize)]
struct CategoryRow {
    name: String,
    r#type: String,
    linked: String,
    deleted: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let all = sub.get_flag("all");
    let data: Vec<CategoryRow> = snapshot
        .categories
        .iter()
        .filter(|c| all || !c.deleted)
        .map(|c| CategoryRow {
            name: c.name.clone(),
            r#type: c.r#type.to_string(),
            linked: if let Some(d) = snapshot.debt_for_category(&c.id) {
                format!("debt: {}", d.name)
            } else if let Some(g) = snapshot.goal_for_category(&c.id) {
                format!("goal: {}", g.name)
            } else {
                String::new()
            },
            deleted: c.deleted,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.name,
                    r.r#type,
                    r.linked,
                    if r.deleted { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Type", "Linked", "Deleted"], rows)
        );
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::categories::sync_linked;
use super::Clock;
use crate::db::{delete_goal, load_snapshot, new_id, save_goal, soft_delete_category};
use crate::engine::effects::mark_completion;
use crate::models::{Category, FlowType, Goal, Snapshot};
use crate::utils::{
    arg, fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal, pretty_table,
};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, clock: &Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let target = parse_decimal(arg(sub, "target")?)?;
            let deadline = parse_date(arg(sub, "deadline")?)?;
            let (goal, cat) = add(conn, name, target, deadline, clock.today)?;
            println!(
                "Added goal '{}' ({} by {}), linked category '{}'",
                goal.name,
                fmt_money(&goal.target),
                goal.deadline,
                cat.name
            );
        }
        Some(("edit", sub)) => {
            let update = GoalUpdate {
                name: opt_arg(sub, "rename"),
                target: opt_arg(sub, "target").map(parse_decimal).transpose()?,
                deadline: opt_arg(sub, "deadline").map(parse_date).transpose()?,
            };
            let (goal, cat) = edit(conn, arg(sub, "name")?, update, clock.today)?;
            println!(
                "Updated goal '{}' ({} of {} by {}), linked category '{}'",
                goal.name,
                fmt_money(&goal.current),
                fmt_money(&goal.target),
                goal.deadline,
                cat.name
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            remove(conn, name)?;
            println!("Removed goal '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn find<'a>(snapshot: &'a Snapshot, name: &str) -> Result<&'a Goal> {
    snapshot
        .goals
        .iter()
        .find(|g| same_name(&g.name, name))
        .with_context(|| format!("Goal '{}' not found", name))
}

fn linked_base(name: &str) -> String {
    format!("{} - Goal", name)
}

fn check_target(target: Decimal) -> Result<()> {
    if target <= Decimal::ZERO {
        bail!("Goal target must be greater than zero");
    }
    Ok(())
}

fn check_deadline(deadline: NaiveDate, today: NaiveDate) -> Result<()> {
    if deadline <= today {
        bail!("Deadline must be after today");
    }
    Ok(())
}

/// Create a goal at zero progress with its linked "<name> - Goal" category.
pub fn add(
    conn: &Connection,
    name: &str,
    target: Decimal,
    deadline: NaiveDate,
    today: NaiveDate,
) -> Result<(Goal, Category)> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Goal name required");
    }
    check_target(target)?;
    check_deadline(deadline, today)?;
    let snapshot = load_snapshot(conn)?;
    if snapshot.goals.iter().any(|g| same_name(&g.name, name)) {
        bail!("Goal '{}' already exists", name);
    }
    let cat = sync_linked(conn, &snapshot, None, &linked_base(name), FlowType::Saving)?;
    let goal = Goal {
        id: new_id(),
        name: name.to_string(),
        target,
        current: Decimal::ZERO,
        deadline,
        created: today,
        completed_at: None,
        linked_category_id: Some(cat.id.clone()),
    };
    save_goal(conn, &goal)?;
    Ok((goal, cat))
}

/// Fields a goal edit may change. Saved progress only moves through
/// transactions.
#[derive(Debug, Default)]
pub struct GoalUpdate<'a> {
    pub name: Option<&'a str>,
    pub target: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
}

pub fn edit(
    conn: &Connection,
    name: &str,
    update: GoalUpdate<'_>,
    today: NaiveDate,
) -> Result<(Goal, Category)> {
    let snapshot = load_snapshot(conn)?;
    let mut goal = find(&snapshot, name)?.clone();
    if let Some(new_name) = update.name {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            bail!("Goal name required");
        }
        let taken = snapshot
            .goals
            .iter()
            .any(|g| g.id != goal.id && same_name(&g.name, new_name));
        if taken {
            bail!("Goal '{}' already exists", new_name);
        }
        goal.name = new_name.to_string();
    }
    if let Some(target) = update.target {
        check_target(target)?;
        goal.target = target;
        mark_completion(&mut goal, today);
    }
    if let Some(deadline) = update.deadline {
        check_deadline(deadline, today)?;
        goal.deadline = deadline;
    }
    let cat = sync_linked(
        conn,
        &snapshot,
        goal.linked_category_id.as_deref(),
        &linked_base(&goal.name),
        FlowType::Saving,
    )?;
    goal.linked_category_id = Some(cat.id.clone());
    save_goal(conn, &goal)?;
    Ok((goal, cat))
}

pub fn remove(conn: &Connection, name: &str) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let goal = find(&snapshot, name)?;
    delete_goal(conn, &goal.id)?;
    if let Some(cat) = &goal.linked_category_id {
        soft_delete_category(conn, cat)?;
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snapshot.goals)? {
        let rows = snapshot
            .goals
            .iter()
            .map(|g| {
                let pct = if g.target.is_zero() {
                    Decimal::ZERO
                } else {
                    (g.current / g.target * Decimal::ONE_HUNDRED).round_dp(1)
                };
                vec![
                    g.name.clone(),
                    fmt_money(&g.current),
                    fmt_money(&g.target),
                    format!("{}%", pct),
                    g.deadline.to_string(),
                    g.completed_at.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Goal", "Saved", "Target", "Progress", "Deadline", "Completed"],
                rows
            )
        );
    }
    Ok(())
}

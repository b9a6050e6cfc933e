// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Clock;
use crate::db::load_snapshot;
use crate::engine::calendar::is_future_cycle;
use crate::engine::opening::open_balance_status;
use crate::models::Snapshot;
use crate::utils::{fmt_money, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &Connection, clock: &Clock) -> Result<()> {
    let rows = issues(&load_snapshot(conn)?, clock);
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn issues(snapshot: &Snapshot, clock: &Clock) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let index = snapshot.category_index();

    for t in &snapshot.transactions {
        if !index.contains_key(t.category_id.as_str()) {
            rows.push(vec!["txn_unknown_category".into(), format!("{} {}", t.id, t.category_id)]);
        }
        if t.amount < Decimal::ZERO {
            rows.push(vec!["txn_negative_amount".into(), format!("{} {}", t.id, t.amount)]);
        }
        if is_future_cycle(t.date, clock.today, clock.anchor) {
            rows.push(vec!["txn_future_cycle".into(), format!("{} {}", t.id, t.date)]);
        }
    }

    let ob = open_balance_status(snapshot);
    if ob.total < ob.used {
        rows.push(vec![
            "open_balance_below_used".into(),
            format!("{} < {}", fmt_money(&ob.total), fmt_money(&ob.used)),
        ]);
    }

    for d in &snapshot.debts {
        let ok = d
            .linked_category_id
            .as_deref()
            .is_some_and(|id| index.contains_key(id));
        if !ok {
            rows.push(vec!["debt_unlinked".into(), d.name.clone()]);
        }
    }
    for g in &snapshot.goals {
        let ok = g
            .linked_category_id
            .as_deref()
            .is_some_and(|id| index.contains_key(id));
        if !ok {
            rows.push(vec!["goal_unlinked".into(), g.name.clone()]);
        }
    }
    rows
}

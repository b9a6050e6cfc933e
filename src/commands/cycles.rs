// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Clock;
use crate::db::load_snapshot;
use crate::engine::ledger::pace_comparison;
use crate::engine::opening::open_balance_status;
use crate::engine::{remaining_for_cycle, CycleSummary, RunningLedger};
use crate::utils::{fmt_money, maybe_print_json, opt_arg, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, clock: &Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, clock, sub)?,
        Some(("history", sub)) => history(conn, clock, sub)?,
        Some(("pace", sub)) => pace(conn, clock, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary_row(s: &CycleSummary) -> Vec<String> {
    vec![
        s.cycle.to_string(),
        fmt_money(&s.carried),
        fmt_money(&s.income),
        fmt_money(&s.expense),
        fmt_money(&s.saving),
        fmt_money(&s.remaining),
    ]
}

const SUMMARY_HEADERS: [&str; 6] = ["Cycle", "Carried", "Income", "Expense", "Saving", "Remaining"];

fn show(conn: &Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let date = match opt_arg(sub, "date") {
        Some(d) => parse_date(d)?,
        None => clock.today,
    };
    let summary = remaining_for_cycle(&snapshot, date, clock.anchor);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        println!(
            "{}",
            pretty_table(&SUMMARY_HEADERS, vec![summary_row(&summary)])
        );
        if summary.cycle.contains(clock.today) {
            let ob = open_balance_status(&snapshot);
            if !ob.total.is_zero() {
                println!(
                    "Opening balance available this cycle: {}",
                    fmt_money(&ob.remaining)
                );
            }
        }
    }
    Ok(())
}

fn history(conn: &Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let ledger = RunningLedger::build(&snapshot, clock.anchor);
    let data = ledger.history(clock.today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data.iter().map(summary_row).collect();
        println!("{}", pretty_table(&SUMMARY_HEADERS, rows));
    }
    Ok(())
}

fn pace(conn: &Connection, clock: &Clock, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = load_snapshot(conn)?;
    let p = pace_comparison(&snapshot, clock.anchor, clock.today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        let rows = vec![
            vec![
                "This cycle".to_string(),
                p.current_window.to_string(),
                fmt_money(&p.current_outflow),
            ],
            vec![
                "Previous cycle".to_string(),
                p.previous_window.to_string(),
                fmt_money(&p.previous_outflow),
            ],
        ];
        println!("{}", pretty_table(&["Period", "Window", "Spent"], rows));
        println!(
            "Day {}: {} {} than at the same point last cycle",
            p.days_elapsed,
            fmt_money(&p.difference.abs()),
            if p.difference.is_sign_negative() { "less" } else { "more" }
        );
    }
    Ok(())
}

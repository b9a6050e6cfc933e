// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Clock;
use crate::db::{db_path, get_anchor_day, set_anchor_day};
use crate::engine::{cycle_range, AnchorDay};
use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, clock: &Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let stored = get_anchor_day(conn)?;
            let cycle = cycle_range(clock.today, clock.anchor);
            let rows = vec![
                vec!["database".to_string(), db_path()?.display().to_string()],
                vec!["cycle_anchor_day".to_string(), stored.to_string()],
                vec!["today".to_string(), clock.today.to_string()],
                vec!["current_cycle".to_string(), cycle.to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-anchor-day", sub)) => {
            let day = *sub.get_one::<u32>("day").context("Missing --day")?;
            let anchor = AnchorDay::new(day)?;
            set_anchor_day(conn, anchor)?;
            println!(
                "Cycles now start on day {}; current cycle is {}",
                anchor,
                cycle_range(clock.today, anchor)
            );
        }
        _ => {}
    }
    Ok(())
}

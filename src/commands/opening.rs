// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{commit_open_balance, load_snapshot};
use crate::engine::opening::open_balance_status;
use crate::engine::Verdict;
use crate::utils::{arg, fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{bail, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let status = open_balance_status(&load_snapshot(conn)?);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &status)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Opening balance", "Used", "Remaining"],
                        vec![vec![
                            fmt_money(&status.total),
                            fmt_money(&status.used),
                            fmt_money(&status.remaining),
                        ]],
                    )
                );
            }
        }
        Some(("set", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            match commit_open_balance(conn, amount)? {
                Verdict::Reject(reason) => bail!("Rejected: {}", reason),
                _ => println!("Opening balance set to {}", fmt_money(&amount)),
            }
        }
        _ => {}
    }
    Ok(())
}

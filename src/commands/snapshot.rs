// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{default_categories, load_snapshot, replace_snapshot};
use crate::models::Snapshot;
use crate::utils::{arg, opt_arg};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let snapshot = load_snapshot(conn)?;
            match opt_arg(sub, "out") {
                Some(path) => {
                    write_json(Path::new(path), &snapshot)?;
                    println!("Exported {} transactions to {}", snapshot.transactions.len(), path);
                }
                None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            }
        }
        Some(("import", sub)) => {
            let path = arg(sub, "file")?;
            let snapshot = read_json(Path::new(path))?;
            replace_snapshot(conn, &snapshot)?;
            println!(
                "Imported {} categories, {} transactions, {} debts, {} goals",
                snapshot.categories.len(),
                snapshot.transactions.len(),
                snapshot.debts.len(),
                snapshot.goals.len()
            );
        }
        Some(("reset", _)) => {
            replace_snapshot(conn, &default_snapshot())?;
            println!("Data reset to defaults");
        }
        _ => {}
    }
    Ok(())
}

pub fn default_snapshot() -> Snapshot {
    Snapshot {
        categories: default_categories(),
        ..Snapshot::default()
    }
}

pub fn read_json(path: &Path) -> Result<Snapshot> {
    let f = File::open(path).with_context(|| format!("Open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("Invalid snapshot JSON in {}", path.display()))
}

pub fn write_json(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let f = File::create(path).with_context(|| format!("Create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, snapshot)?;
    w.flush()?;
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use koinfo::commands::Clock;
use koinfo::{cli, commands, db};

fn init_tracing(verbose: bool) {
    let default = if verbose { "koinfo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_tracing(matches.get_flag("verbose"));

    let mut conn = db::open_or_init()?;
    let clock = Clock::resolve(&conn, &matches)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(&conn, &clock, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&conn, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&conn, &clock, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, &clock, sub)?,
        Some(("cycle", sub)) => commands::cycles::handle(&conn, &clock, sub)?,
        Some(("open-balance", sub)) => commands::opening::handle(&mut conn, sub)?,
        Some(("snapshot", sub)) => commands::snapshot::handle(&mut conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn, &clock)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod cycles;
pub mod debts;
pub mod doctor;
pub mod goals;
pub mod opening;
pub mod settings;
pub mod snapshot;
pub mod transactions;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::engine::AnchorDay;
use crate::utils::{opt_arg, parse_date};

/// The two inputs every ledger computation is parameterised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub today: NaiveDate,
    pub anchor: AnchorDay,
}

impl Clock {
    /// `--today` / `--anchor-day` when given, otherwise the local date and
    /// the stored anchor day.
    pub fn resolve(conn: &Connection, m: &clap::ArgMatches) -> Result<Self> {
        let today = match opt_arg(m, "today") {
            Some(s) => parse_date(s)?,
            None => chrono::Local::now().date_naive(),
        };
        let anchor = match m.get_one::<u32>("anchor-day") {
            Some(day) => AnchorDay::new(*day)?,
            None => crate::db::get_anchor_day(conn)?,
        };
        Ok(Clock { today, anchor })
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::models::Category;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// A required string argument, trimmed.
pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing --{}", name))
}

pub fn opt_arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name).map(|s| s.trim())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// `desired` made unique among active category names, ignoring `exclude_id`.
/// Collisions are resolved by appending " 2", " 3", ...
pub fn unique_name_excluding(
    categories: &[Category],
    desired: &str,
    exclude_id: Option<&str>,
) -> String {
    let base = desired.trim();
    let taken = |cand: &str| {
        let cand = cand.to_lowercase();
        categories.iter().any(|c| {
            !c.deleted
                && Some(c.id.as_str()) != exclude_id
                && c.name.trim().to_lowercase() == cand
        })
    };
    if !taken(base) {
        return base.to_string();
    }
    let mut i = 2;
    loop {
        let cand = format!("{} {}", base, i);
        if !taken(&cand) {
            return cand;
        }
        i += 1;
    }
}

pub fn active_category_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = name.trim().to_lowercase();
    categories
        .iter()
        .find(|c| !c.deleted && c.name.trim().to_lowercase() == name)
}

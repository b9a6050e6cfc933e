// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget cycles anchored on a day of the month.
//!
//! A cycle is the half-open interval `[start, next_start)`. The start day is
//! the anchor day clamped to the month's length, so an anchor of 31 starts
//! February's cycle on the 28th (or 29th) and April's on the 30th.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Day of the month (1..=31) on which every cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AnchorDay(u32);

impl AnchorDay {
    pub const FIRST: AnchorDay = AnchorDay(1);

    pub fn new(day: u32) -> Result<Self, ValidationError> {
        if (1..=31).contains(&day) {
            Ok(AnchorDay(day))
        } else {
            Err(ValidationError::AnchorDay(day))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for AnchorDay {
    fn default() -> Self {
        AnchorDay::FIRST
    }
}

impl TryFrom<u32> for AnchorDay {
    type Error = ValidationError;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        AnchorDay::new(day)
    }
}

impl From<AnchorDay> for u32 {
    fn from(a: AnchorDay) -> u32 {
        a.0
    }
}

impl fmt::Display for AnchorDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One budget cycle, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Cycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day that still belongs to the cycle.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.last_day())
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Anchor day clamped into the given month.
fn anchored(year: i32, month: u32, anchor: AnchorDay) -> NaiveDate {
    let day = anchor.get().min(days_in_month(year, month));
    // Only out of range at the very edge of chrono's supported years.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

fn shift_month(year: i32, month: u32, by: i32) -> (i32, u32) {
    let idx = year * 12 + month as i32 - 1 + by;
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}

/// Start of the cycle containing `date`.
pub fn cycle_start(date: NaiveDate, anchor: AnchorDay) -> NaiveDate {
    let this_month = anchored(date.year(), date.month(), anchor);
    if date.day() >= this_month.day() {
        this_month
    } else {
        let (y, m) = shift_month(date.year(), date.month(), -1);
        anchored(y, m, anchor)
    }
}

/// Start of the cycle after the one starting at `start`.
///
/// The day is re-derived from the anchor, not from `start`: a cycle that
/// started on Feb 28 under anchor 31 is followed by one starting Mar 31.
pub fn next_cycle_start(start: NaiveDate, anchor: AnchorDay) -> NaiveDate {
    let (y, m) = shift_month(start.year(), start.month(), 1);
    anchored(y, m, anchor)
}

pub fn previous_cycle_start(start: NaiveDate, anchor: AnchorDay) -> NaiveDate {
    let (y, m) = shift_month(start.year(), start.month(), -1);
    anchored(y, m, anchor)
}

pub fn cycle_range(date: NaiveDate, anchor: AnchorDay) -> Cycle {
    let start = cycle_start(date, anchor);
    Cycle {
        start,
        end: next_cycle_start(start, anchor),
    }
}

/// Whether `date` falls in a cycle after the one containing `today`.
pub fn is_future_cycle(date: NaiveDate, today: NaiveDate, anchor: AnchorDay) -> bool {
    cycle_start(date, anchor) > cycle_start(today, anchor)
}

/// Cycles from the one containing `from` through the one containing `through`.
pub fn cycles_between(from: NaiveDate, through: NaiveDate, anchor: AnchorDay) -> Vec<Cycle> {
    let mut out = Vec::new();
    let last = cycle_start(through, anchor);
    let mut start = cycle_start(from, anchor);
    while start <= last {
        let end = next_cycle_start(start, anchor);
        out.push(Cycle { start, end });
        if end <= start {
            break;
        }
        start = end;
    }
    out
}

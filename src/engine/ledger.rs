// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cycle aggregates and the carried-forward "remaining" budget.
//!
//! `remaining` for a cycle folds every transaction before the cycle into one
//! carried balance and adds the cycle's own net flow. [`RunningLedger`]
//! produces the same numbers from per-cycle totals built in one pass.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::calendar::{
    cycle_range, cycle_start, cycles_between, next_cycle_start, previous_cycle_start, AnchorDay,
    Cycle,
};
use super::classify::{budget_flow, outflow_amount};
use crate::models::{FlowType, Snapshot, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub saving: Decimal,
}

impl FlowTotals {
    pub fn add(&mut self, flow: FlowType, amount: Decimal) {
        let amount = amount.abs();
        match flow {
            FlowType::Income => self.income += amount,
            FlowType::Expense => self.expense += amount,
            FlowType::Saving => self.saving += amount,
        }
    }

    pub fn outflow(&self) -> Decimal {
        self.expense + self.saving
    }

    pub fn net(&self) -> Decimal {
        self.income - self.outflow()
    }
}

/// Totals for one cycle plus the balance carried into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub cycle: Cycle,
    pub income: Decimal,
    pub expense: Decimal,
    pub saving: Decimal,
    pub carried: Decimal,
    pub remaining: Decimal,
}

impl CycleSummary {
    fn new(cycle: Cycle, carried: Decimal, current: FlowTotals) -> Self {
        CycleSummary {
            cycle,
            income: current.income,
            expense: current.expense,
            saving: current.saving,
            carried,
            remaining: carried + current.net(),
        }
    }
}

fn totals<'a>(
    snapshot: &Snapshot,
    txns: impl Iterator<Item = &'a Transaction>,
) -> FlowTotals {
    let index = snapshot.category_index();
    let mut t = FlowTotals::default();
    for txn in txns {
        if let Some(flow) = budget_flow(txn, &index) {
            t.add(flow, txn.amount);
        }
    }
    t
}

/// Summary of the cycle that starts at (or contains) `start`.
///
/// `start` is normalised to its cycle boundary first, so any date inside the
/// cycle selects the same window.
pub fn remaining_for_cycle(
    snapshot: &Snapshot,
    start: NaiveDate,
    anchor: AnchorDay,
) -> CycleSummary {
    let start = cycle_start(start, anchor);
    let cycle = Cycle {
        start,
        end: next_cycle_start(start, anchor),
    };
    let carry = totals(snapshot, snapshot.transactions.iter().filter(|t| t.date < cycle.start));
    let current = totals(
        snapshot,
        snapshot.transactions.iter().filter(|t| cycle.contains(t.date)),
    );
    let summary = CycleSummary::new(cycle, carry.net(), current);
    debug!(
        cycle = %cycle,
        carried = %summary.carried,
        remaining = %summary.remaining,
        "computed cycle remaining"
    );
    summary
}

pub fn remaining_this_month(
    snapshot: &Snapshot,
    anchor: AnchorDay,
    today: NaiveDate,
) -> CycleSummary {
    remaining_for_cycle(snapshot, cycle_start(today, anchor), anchor)
}

/// Month-to-date outflow against the same elapsed window one cycle back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaceComparison {
    pub days_elapsed: i64,
    pub current_window: Cycle,
    pub previous_window: Cycle,
    pub current_outflow: Decimal,
    pub previous_outflow: Decimal,
    /// `current_outflow - previous_outflow`; positive means spending faster.
    pub difference: Decimal,
}

fn outflow_in(snapshot: &Snapshot, window: Cycle) -> Decimal {
    let index = snapshot.category_index();
    snapshot
        .transactions
        .iter()
        .filter(|t| window.contains(t.date))
        .map(|t| outflow_amount(budget_flow(t, &index), t.amount))
        .sum()
}

pub fn pace_comparison(snapshot: &Snapshot, anchor: AnchorDay, today: NaiveDate) -> PaceComparison {
    let cycle = cycle_range(today, anchor);
    let days_elapsed = (today - cycle.start).num_days() + 1;
    let current_window = Cycle {
        start: cycle.start,
        end: today + Duration::days(1),
    };
    let prev_start = previous_cycle_start(cycle.start, anchor);
    let previous_window = Cycle {
        start: prev_start,
        end: (prev_start + Duration::days(days_elapsed)).min(cycle.start),
    };
    let current_outflow = outflow_in(snapshot, current_window);
    let previous_outflow = outflow_in(snapshot, previous_window);
    PaceComparison {
        days_elapsed,
        current_window,
        previous_window,
        current_outflow,
        previous_outflow,
        difference: current_outflow - previous_outflow,
    }
}

/// Per-cycle flow totals indexed by cycle start.
///
/// Built once per snapshot; every summary it produces matches
/// [`remaining_for_cycle`] for the same cycle.
#[derive(Debug, Clone)]
pub struct RunningLedger {
    anchor: AnchorDay,
    cycles: BTreeMap<NaiveDate, FlowTotals>,
}

impl RunningLedger {
    pub fn build(snapshot: &Snapshot, anchor: AnchorDay) -> Self {
        let index = snapshot.category_index();
        let mut cycles: BTreeMap<NaiveDate, FlowTotals> = BTreeMap::new();
        for txn in &snapshot.transactions {
            if let Some(flow) = budget_flow(txn, &index) {
                cycles
                    .entry(cycle_start(txn.date, anchor))
                    .or_default()
                    .add(flow, txn.amount);
            }
        }
        RunningLedger { anchor, cycles }
    }

    /// Summary of the cycle containing `date`.
    pub fn summary(&self, date: NaiveDate) -> CycleSummary {
        let cycle = cycle_range(date, self.anchor);
        let carried: Decimal = self.cycles.range(..cycle.start).map(|(_, t)| t.net()).sum();
        let current = self.cycles.get(&cycle.start).copied().unwrap_or_default();
        CycleSummary::new(cycle, carried, current)
    }

    /// Every cycle from the first one with activity through the one containing
    /// `through`, carrying the balance forward cycle by cycle.
    pub fn history(&self, through: NaiveDate) -> Vec<CycleSummary> {
        let Some(first) = self.cycles.keys().next().copied() else {
            return Vec::new();
        };
        let mut carried = Decimal::ZERO;
        let mut out = Vec::new();
        for cycle in cycles_between(first, through, self.anchor) {
            let current = self.cycles.get(&cycle.start).copied().unwrap_or_default();
            let summary = CycleSummary::new(cycle, carried, current);
            carried = summary.remaining;
            out.push(summary);
        }
        out
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The opening balance: funds held before the ledger started, which
//! transactions in the current cycle may draw on instead of the cycle budget.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::calendar::{cycle_start, AnchorDay};
use super::error::{Rejection, ValidationError, Verdict};
use crate::models::{Snapshot, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenBalanceStatus {
    pub total: Decimal,
    pub used: Decimal,
    pub remaining: Decimal,
}

pub fn open_balance_used(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.use_open_balance)
        .map(|t| t.amount.abs())
        .sum()
}

pub fn open_balance_remaining(snapshot: &Snapshot) -> Decimal {
    open_balance_status(snapshot).remaining
}

pub fn open_balance_status(snapshot: &Snapshot) -> OpenBalanceStatus {
    let used = open_balance_used(&snapshot.transactions);
    OpenBalanceStatus {
        total: snapshot.open_balance,
        used,
        remaining: (snapshot.open_balance - used).max(Decimal::ZERO),
    }
}

/// Whether a transaction dated `date` may draw on the opening balance today.
pub fn may_draw_open_balance(date: NaiveDate, today: NaiveDate, anchor: AnchorDay) -> bool {
    cycle_start(date, anchor) == cycle_start(today, anchor)
}

/// Check a new opening balance value against what transactions already use.
pub fn evaluate_open_balance_update(
    snapshot: &Snapshot,
    new_value: Decimal,
) -> Result<Verdict, ValidationError> {
    if new_value < Decimal::ZERO {
        return Err(ValidationError::NegativeOpenBalance(new_value));
    }
    let used = open_balance_used(&snapshot.transactions);
    if new_value < used {
        return Ok(Verdict::Reject(Rejection::OpeningBalanceBelowUsed {
            requested: new_value,
            used,
        }));
    }
    Ok(Verdict::Accept)
}

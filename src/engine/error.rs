// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Outcome and error types returned by the ledger engine.
//!
//! Business-rule violations are not errors in the Rust sense: they come back
//! as [`Verdict::Reject`] so the caller can decide how to surface them.
//! Only malformed input produces a [`ValidationError`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Malformed input, detected before any guard logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("anchor day {0} is outside 1..=31")]
    AnchorDay(u32),
    #[error("amount {0} must not be negative")]
    NegativeAmount(Decimal),
    #[error("category '{0}' not found")]
    UnknownCategory(String),
    #[error("category '{0}' is deleted and cannot take new transactions")]
    DeletedCategory(String),
    #[error("a transaction cannot be both a debt claim and a goal withdrawal")]
    ConflictingFlags,
    #[error("category '{0}' is not linked to a receivable debt")]
    ClaimWithoutReceivable(String),
    #[error("category '{0}' is not linked to a goal")]
    WithdrawalWithoutGoal(String),
    #[error("opening balance can only be used in the current cycle (starting {0})")]
    OpenBalanceOutsideCurrentCycle(NaiveDate),
    #[error("opening balance {0} must not be negative")]
    NegativeOpenBalance(Decimal),
}

/// A write that is well-formed but violates a financial guard.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("date is in a future cycle (cycle starts {cycle_start}, current cycle starts {current_start})")]
    FutureCycle {
        cycle_start: NaiveDate,
        current_start: NaiveDate,
    },
    #[error("exceeds available amount: needs {needed}, available {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("withdrawal of {requested} exceeds the {saved} saved in goal '{goal}'")]
    GoalWithdrawalExceedsSaved {
        goal: String,
        requested: Decimal,
        saved: Decimal,
    },
    #[error("payment of {payment} exceeds the {balance} balance of debt '{debt}'")]
    DebtPaymentExceedsBalance {
        debt: String,
        payment: Decimal,
        balance: Decimal,
    },
    #[error("cannot reduce opening balance to {requested}: {used} is already used")]
    OpeningBalanceBelowUsed { requested: Decimal, used: Decimal },
}

/// Advisory outcome: the write proceeds but the user should be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    GoalExceeded { goal: String, over: Decimal },
    GoalReached { goal: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::GoalExceeded { goal, over } => {
                write!(f, "goal '{}' exceeded by {}", goal, over)
            }
            Notice::GoalReached { goal } => write!(f, "goal '{}' reached", goal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    AcceptWithWarning(Notice),
    Reject(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Verdict::Reject(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Reject(r) => Some(r),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Verdict::AcceptWithWarning(n) => Some(n),
            _ => None,
        }
    }
}

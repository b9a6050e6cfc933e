// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cycle-based ledger engine. Pure functions over a [`Snapshot`]; the anchor
//! day and `today` are always passed in.
//!
//! [`Snapshot`]: crate::models::Snapshot

pub mod calendar;
pub mod classify;
pub mod effects;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod opening;

pub use calendar::{cycle_range, cycle_start, next_cycle_start, AnchorDay, Cycle};
pub use classify::classify;
pub use error::{Notice, Rejection, ValidationError, Verdict};
pub use guard::evaluate_transaction_write;
pub use ledger::{remaining_for_cycle, remaining_this_month, CycleSummary, RunningLedger};
pub use opening::{evaluate_open_balance_update, open_balance_remaining};

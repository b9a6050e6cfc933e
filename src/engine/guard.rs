// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pre-commit checks for transaction writes.
//!
//! Each evaluation is a pure function of the candidate, the snapshot, the
//! anchor day and `today`. It is advisory: callers that allow concurrent
//! writers must run read, guard and write as one serialized unit.
//!
//! When an edit keeps the same cycle, category, kind and opening-balance flag,
//! only the change in amount is checked, because the snapshot already reflects
//! the stored transaction. Any other edit is evaluated at its full amount.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::calendar::{cycle_start, is_future_cycle, AnchorDay};
use super::classify::{classify_kind, outflow_amount};
use super::error::{Notice, Rejection, ValidationError, Verdict};
use super::ledger::remaining_for_cycle;
use super::opening::{may_draw_open_balance, open_balance_remaining};
use crate::models::{Category, DebtKind, Snapshot, Transaction, TransactionDraft, TxnKind};

/// Reject malformed candidates before any guard runs.
pub fn validate_candidate<'s>(
    candidate: &TransactionDraft,
    snapshot: &'s Snapshot,
    anchor: AnchorDay,
    today: NaiveDate,
    prior: Option<&Transaction>,
) -> Result<&'s Category, ValidationError> {
    if candidate.amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(candidate.amount));
    }
    let category = snapshot
        .category(&candidate.category_id)
        .ok_or_else(|| ValidationError::UnknownCategory(candidate.category_id.clone()))?;
    // Existing entries on a deleted category stay editable; new references are refused.
    let keeps_category = prior.is_some_and(|p| p.category_id == candidate.category_id);
    if category.deleted && !keeps_category {
        return Err(ValidationError::DeletedCategory(category.name.clone()));
    }
    // Edits that keep category and kind skip the link check; the debt or goal
    // may have been removed since.
    let keeps_kind = prior.is_some_and(|p| {
        p.category_id == candidate.category_id && p.kind == candidate.kind
    });
    match candidate.kind {
        _ if keeps_kind => {}
        TxnKind::Plain => {}
        TxnKind::DebtClaim => {
            let receivable = snapshot
                .debt_for_category(&category.id)
                .is_some_and(|d| d.kind == DebtKind::Receivable);
            if !receivable {
                return Err(ValidationError::ClaimWithoutReceivable(category.name.clone()));
            }
        }
        TxnKind::GoalWithdrawal => {
            if snapshot.goal_for_category(&category.id).is_none() {
                return Err(ValidationError::WithdrawalWithoutGoal(category.name.clone()));
            }
        }
    }
    // Future-cycle dates are left for the guard to reject.
    let past_cycle = !is_future_cycle(candidate.date, today, anchor)
        && !may_draw_open_balance(candidate.date, today, anchor);
    if candidate.use_open_balance && past_cycle {
        let already_drawing = prior.is_some_and(|p| p.use_open_balance && p.date == candidate.date);
        if !already_drawing {
            return Err(ValidationError::OpenBalanceOutsideCurrentCycle(cycle_start(
                today, anchor,
            )));
        }
    }
    Ok(category)
}

/// The stored transaction, if the edit is eligible for delta comparison.
fn same_slot<'p>(
    candidate: &TransactionDraft,
    prior: Option<&'p Transaction>,
    anchor: AnchorDay,
) -> Option<&'p Transaction> {
    prior.filter(|old| {
        cycle_start(old.date, anchor) == cycle_start(candidate.date, anchor)
            && old.category_id == candidate.category_id
            && old.kind == candidate.kind
            && old.use_open_balance == candidate.use_open_balance
    })
}

/// Signed change in amount this write introduces.
fn amount_change(candidate: &TransactionDraft, slot: Option<&Transaction>) -> Decimal {
    match slot {
        Some(old) => candidate.amount - old.amount,
        None => candidate.amount,
    }
}

pub fn evaluate_transaction_write(
    candidate: &TransactionDraft,
    snapshot: &Snapshot,
    anchor: AnchorDay,
    today: NaiveDate,
    prior: Option<&Transaction>,
) -> Result<Verdict, ValidationError> {
    let category = validate_candidate(candidate, snapshot, anchor, today, prior)?;
    let verdict = run_guards(candidate, category, snapshot, anchor, today, prior);
    debug!(
        date = %candidate.date,
        amount = %candidate.amount,
        category = %category.name,
        edit = prior.is_some(),
        ?verdict,
        "evaluated transaction write"
    );
    Ok(verdict)
}

fn run_guards(
    candidate: &TransactionDraft,
    category: &Category,
    snapshot: &Snapshot,
    anchor: AnchorDay,
    today: NaiveDate,
    prior: Option<&Transaction>,
) -> Verdict {
    let current_start = cycle_start(today, anchor);
    let candidate_start = cycle_start(candidate.date, anchor);
    if candidate_start > current_start {
        return Verdict::Reject(Rejection::FutureCycle {
            cycle_start: candidate_start,
            current_start,
        });
    }

    let slot = same_slot(candidate, prior, anchor);
    let change = amount_change(candidate, slot);
    let flow = classify_kind(candidate.kind, Some(category));

    if flow.is_some_and(|f| f.is_outflow()) {
        let new_out = outflow_amount(flow, candidate.amount);
        let delta_out = match slot {
            Some(old) => (new_out - outflow_amount(flow, old.amount)).max(Decimal::ZERO),
            None => new_out,
        };
        if delta_out > Decimal::ZERO {
            let cycle_remaining = remaining_for_cycle(snapshot, candidate_start, anchor).remaining;
            let open_extra = if candidate.use_open_balance && candidate_start == current_start {
                open_balance_remaining(snapshot)
            } else {
                Decimal::ZERO
            };
            let available = cycle_remaining + open_extra;
            if delta_out > available {
                return Verdict::Reject(Rejection::InsufficientFunds {
                    needed: delta_out,
                    available,
                });
            }
        }
    }

    let mut notice = None;
    if let Some(goal) = snapshot.goal_for_category(&candidate.category_id) {
        if candidate.kind.is_goal_withdrawal() {
            let requested = change.max(Decimal::ZERO);
            if requested > goal.current {
                return Verdict::Reject(Rejection::GoalWithdrawalExceedsSaved {
                    goal: goal.name.clone(),
                    requested,
                    saved: goal.current,
                });
            }
        } else if change > Decimal::ZERO {
            let projected = goal.current + change;
            if projected > goal.target {
                notice = Some(Notice::GoalExceeded {
                    goal: goal.name.clone(),
                    over: projected - goal.target,
                });
            } else if projected == goal.target {
                notice = Some(Notice::GoalReached {
                    goal: goal.name.clone(),
                });
            }
        }
    }

    if let Some(debt) = snapshot.debt_for_category(&candidate.category_id) {
        if !candidate.kind.is_debt_claim() {
            let payment = change.max(Decimal::ZERO);
            if payment > debt.balance {
                return Verdict::Reject(Rejection::DebtPaymentExceedsBalance {
                    debt: debt.name.clone(),
                    payment,
                    balance: debt.balance,
                });
            }
        }
    }

    match notice {
        Some(n) => Verdict::AcceptWithWarning(n),
        None => Verdict::Accept,
    }
}

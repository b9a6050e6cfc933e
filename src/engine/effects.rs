// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance changes on linked debts and goals after an accepted write.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{DebtKind, Goal, Snapshot, Transaction, TxnKind};

/// Signed change a transaction makes to its debt's balance.
pub fn debt_effect(debt_kind: DebtKind, amount: Decimal, kind: TxnKind) -> Decimal {
    let amount = amount.abs();
    match (kind, debt_kind) {
        (TxnKind::DebtClaim, DebtKind::Receivable) => amount,
        _ => -amount,
    }
}

/// Signed change a transaction makes to its goal's saved amount.
pub fn goal_effect(amount: Decimal, kind: TxnKind) -> Decimal {
    if kind.is_goal_withdrawal() {
        -amount
    } else {
        amount
    }
}

/// Set `completed_at` once the target is met; clear it when progress falls short.
pub fn mark_completion(goal: &mut Goal, today: NaiveDate) {
    if goal.current >= goal.target && goal.target > Decimal::ZERO {
        goal.completed_at.get_or_insert(today);
    } else {
        goal.completed_at = None;
    }
}

/// Add (`sign = 1`) or revert (`sign = -1`) a transaction's linked effects.
/// Returns the ids of the touched debt and goal.
fn shift_linked(
    snapshot: &mut Snapshot,
    txn: &Transaction,
    sign: Decimal,
    today: NaiveDate,
) -> (Option<String>, Option<String>) {
    let mut touched = (None, None);
    let cat = Some(txn.category_id.as_str());
    if let Some(d) = snapshot
        .debts
        .iter_mut()
        .find(|d| d.linked_category_id.as_deref() == cat)
    {
        let eff = debt_effect(d.kind, txn.amount, txn.kind) * sign;
        d.balance = (d.balance + eff).max(Decimal::ZERO);
        touched.0 = Some(d.id.clone());
    }
    if let Some(g) = snapshot
        .goals
        .iter_mut()
        .find(|g| g.linked_category_id.as_deref() == cat)
    {
        let eff = goal_effect(txn.amount, txn.kind) * sign;
        g.current = (g.current + eff).max(Decimal::ZERO);
        mark_completion(g, today);
        touched.1 = Some(g.id.clone());
    }
    touched
}

/// Debts and goals changed by an applied write, for the store to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Touched {
    pub debts: Vec<String>,
    pub goals: Vec<String>,
}

impl Touched {
    fn record(&mut self, (debt, goal): (Option<String>, Option<String>)) {
        if let Some(d) = debt {
            if !self.debts.contains(&d) {
                self.debts.push(d);
            }
        }
        if let Some(g) = goal {
            if !self.goals.contains(&g) {
                self.goals.push(g);
            }
        }
    }
}

/// Revert `prior` (if any), apply `txn`, and upsert it into the snapshot.
pub fn apply_transaction_write(
    snapshot: &mut Snapshot,
    prior: Option<&Transaction>,
    txn: &Transaction,
    today: NaiveDate,
) -> Touched {
    let mut touched = Touched::default();
    if let Some(old) = prior {
        touched.record(shift_linked(snapshot, old, Decimal::NEGATIVE_ONE, today));
    }
    touched.record(shift_linked(snapshot, txn, Decimal::ONE, today));
    match snapshot.transactions.iter_mut().find(|t| t.id == txn.id) {
        Some(slot) => *slot = txn.clone(),
        None => snapshot.transactions.push(txn.clone()),
    }
    touched
}

/// Remove a transaction and revert its linked effects.
pub fn apply_transaction_delete(
    snapshot: &mut Snapshot,
    id: &str,
    today: NaiveDate,
) -> Option<(Transaction, Touched)> {
    let pos = snapshot.transactions.iter().position(|t| t.id == id)?;
    let txn = snapshot.transactions.remove(pos);
    let mut touched = Touched::default();
    touched.record(shift_linked(snapshot, &txn, Decimal::NEGATIVE_ONE, today));
    Some((txn, touched))
}

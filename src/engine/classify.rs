// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::models::{Category, CategoryIndex, FlowType, Transaction, TxnKind};

/// Flow of a transaction with the given kind against `category`.
///
/// A goal withdrawal is always an inflow and a debt claim always an outflow,
/// whatever the category's nominal type.
pub fn classify_kind(kind: TxnKind, category: Option<&Category>) -> Option<FlowType> {
    match kind {
        TxnKind::GoalWithdrawal => Some(FlowType::Income),
        TxnKind::DebtClaim => Some(FlowType::Expense),
        TxnKind::Plain => category.map(|c| c.r#type),
    }
}

pub fn classify(txn: &Transaction, categories: &CategoryIndex<'_>) -> Option<FlowType> {
    classify_kind(txn.kind, categories.get(txn.category_id.as_str()).copied())
}

/// Flow of a transaction as counted by the cycle aggregates.
///
/// Transactions drawing on the opening balance sit outside the cycle flow.
pub fn budget_flow(txn: &Transaction, categories: &CategoryIndex<'_>) -> Option<FlowType> {
    if txn.use_open_balance {
        None
    } else {
        classify(txn, categories)
    }
}

/// Amount a transaction of this flow takes out of the budget.
pub fn outflow_amount(flow: Option<FlowType>, amount: Decimal) -> Decimal {
    match flow {
        Some(f) if f.is_outflow() => amount.abs(),
        _ => Decimal::ZERO,
    }
}

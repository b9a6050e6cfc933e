// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use koinfo::engine::AnchorDay;
use koinfo::models::{
    Category, Debt, DebtKind, FlowType, Goal, Snapshot, Transaction, TransactionDraft, TxnKind,
};
use rust_decimal::Decimal;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn anchor(day: u32) -> AnchorDay {
    AnchorDay::new(day).unwrap()
}

pub fn category(id: &str, t: FlowType) -> Category {
    Category {
        id: id.to_string(),
        name: id.to_string(),
        r#type: t,
        deleted: false,
    }
}

/// Salary (income), Groceries (expense), Investments (saving).
pub fn base_snapshot() -> Snapshot {
    Snapshot {
        categories: vec![
            category("salary", FlowType::Income),
            category("groceries", FlowType::Expense),
            category("investments", FlowType::Saving),
        ],
        ..Snapshot::default()
    }
}

pub fn txn(id: &str, date: NaiveDate, amount: Decimal, category_id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date,
        amount,
        category_id: category_id.to_string(),
        note: None,
        use_open_balance: false,
        kind: TxnKind::Plain,
    }
}

pub fn draft(date: NaiveDate, amount: Decimal, category_id: &str) -> TransactionDraft {
    TransactionDraft {
        date,
        amount,
        category_id: category_id.to_string(),
        note: None,
        use_open_balance: false,
        kind: TxnKind::Plain,
    }
}

pub fn with_debt(s: &mut Snapshot, name: &str, balance: Decimal, kind: DebtKind) -> String {
    let cat_id = format!("{}-debt", name);
    s.categories.push(category(&cat_id, kind.linked_flow()));
    s.debts.push(Debt {
        id: name.to_string(),
        name: name.to_string(),
        balance,
        kind,
        linked_category_id: Some(cat_id.clone()),
    });
    cat_id
}

pub fn with_goal(s: &mut Snapshot, name: &str, target: Decimal, current: Decimal) -> String {
    let cat_id = format!("{}-goal", name);
    s.categories.push(category(&cat_id, FlowType::Saving));
    s.goals.push(Goal {
        id: name.to_string(),
        name: name.to_string(),
        target,
        current,
        deadline: d(2030, 1, 1),
        created: d(2024, 1, 1),
        completed_at: None,
        linked_category_id: Some(cat_id.clone()),
    });
    cat_id
}

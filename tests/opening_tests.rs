// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use koinfo::engine::opening::{may_draw_open_balance, open_balance_status};
use koinfo::engine::{
    evaluate_open_balance_update, open_balance_remaining, Rejection, ValidationError, Verdict,
};
use rust_decimal_macros::dec;

fn drawn(amount: rust_decimal::Decimal) -> koinfo::models::Snapshot {
    let mut s = base_snapshot();
    s.open_balance = dec!(2000);
    let mut t = txn("ob", d(2024, 3, 4), amount, "groceries");
    t.use_open_balance = true;
    s.transactions.push(t);
    s.transactions.push(txn("plain", d(2024, 3, 5), dec!(700), "groceries"));
    s
}

#[test]
fn reducing_below_used_is_rejected() {
    let s = drawn(dec!(2000));
    assert_eq!(open_balance_remaining(&s), dec!(0));
    let v = evaluate_open_balance_update(&s, dec!(1500)).unwrap();
    assert_eq!(
        v,
        Verdict::Reject(Rejection::OpeningBalanceBelowUsed {
            requested: dec!(1500),
            used: dec!(2000),
        })
    );
    assert_eq!(evaluate_open_balance_update(&s, dec!(2000)).unwrap(), Verdict::Accept);
    assert_eq!(evaluate_open_balance_update(&s, dec!(2500)).unwrap(), Verdict::Accept);
}

#[test]
fn negative_value_fails_validation() {
    let s = base_snapshot();
    let err = evaluate_open_balance_update(&s, dec!(-0.01)).unwrap_err();
    assert_eq!(err, ValidationError::NegativeOpenBalance(dec!(-0.01)));
}

#[test]
fn status_counts_only_flagged_transactions() {
    let s = drawn(dec!(600));
    let status = open_balance_status(&s);
    assert_eq!(status.total, dec!(2000));
    assert_eq!(status.used, dec!(600));
    assert_eq!(status.remaining, dec!(1400));
}

#[test]
fn remaining_never_negative() {
    let mut s = drawn(dec!(600));
    s.open_balance = dec!(100);
    assert_eq!(open_balance_remaining(&s), dec!(0));
}

#[test]
fn drawing_limited_to_current_cycle() {
    let a = anchor(25);
    let today = d(2024, 3, 2);
    // Current cycle: 2024-02-25 .. 2024-03-24
    assert!(may_draw_open_balance(d(2024, 2, 25), today, a));
    assert!(may_draw_open_balance(d(2024, 3, 24), today, a));
    assert!(!may_draw_open_balance(d(2024, 2, 24), today, a));
    assert!(!may_draw_open_balance(d(2024, 3, 25), today, a));
}

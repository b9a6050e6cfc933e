// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::NaiveDate;
use common::*;
use koinfo::engine::guard::evaluate_transaction_write;
use koinfo::engine::{Notice, Rejection, ValidationError, Verdict};
use koinfo::models::{DebtKind, Snapshot, Transaction, TransactionDraft, TxnKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn today() -> NaiveDate {
    d(2024, 3, 15)
}

fn eval(
    candidate: &TransactionDraft,
    s: &Snapshot,
    prior: Option<&Transaction>,
) -> Result<Verdict, ValidationError> {
    evaluate_transaction_write(candidate, s, anchor(1), today(), prior)
}

/// 1000 of income this cycle, nothing spent.
fn funded() -> Snapshot {
    let mut s = base_snapshot();
    s.transactions.push(txn("pay", d(2024, 3, 1), dec!(1000), "salary"));
    s
}

fn short(needed: Decimal, available: Decimal) -> Verdict {
    Verdict::Reject(Rejection::InsufficientFunds { needed, available })
}

#[test]
fn future_cycle_is_rejected() {
    let s = funded();
    let v = eval(&draft(d(2024, 4, 1), dec!(10), "salary"), &s, None).unwrap();
    assert_eq!(
        v,
        Verdict::Reject(Rejection::FutureCycle {
            cycle_start: d(2024, 4, 1),
            current_start: d(2024, 3, 1),
        })
    );
}

#[test]
fn future_cycle_wins_over_opening_balance_check() {
    let mut s = funded();
    s.open_balance = dec!(500);
    let mut c = draft(d(2024, 4, 2), dec!(10), "groceries");
    c.use_open_balance = true;
    let v = eval(&c, &s, None).unwrap();
    assert!(matches!(v, Verdict::Reject(Rejection::FutureCycle { .. })));
}

#[test]
fn later_date_in_current_cycle_is_allowed() {
    let s = funded();
    let v = eval(&draft(d(2024, 3, 31), dec!(10), "groceries"), &s, None).unwrap();
    assert_eq!(v, Verdict::Accept);
}

#[test]
fn expense_beyond_remaining_is_rejected() {
    let s = funded();
    let v = eval(&draft(d(2024, 3, 10), dec!(1000.01), "groceries"), &s, None).unwrap();
    assert_eq!(v, short(dec!(1000.01), dec!(1000)));
    let v = eval(&draft(d(2024, 3, 10), dec!(1000), "investments"), &s, None).unwrap();
    assert_eq!(v, Verdict::Accept);
}

#[test]
fn income_skips_funds_check() {
    let mut s = base_snapshot();
    s.transactions.push(txn("big", d(2024, 3, 2), dec!(5000), "groceries"));
    let v = eval(&draft(d(2024, 3, 10), dec!(20), "salary"), &s, None).unwrap();
    assert_eq!(v, Verdict::Accept);
}

#[test]
fn past_cycle_uses_that_cycles_remaining() {
    let mut s = funded();
    s.transactions.push(txn("feb-pay", d(2024, 2, 1), dec!(100), "salary"));
    let v = eval(&draft(d(2024, 2, 20), dec!(150), "groceries"), &s, None).unwrap();
    assert_eq!(v, short(dec!(150), dec!(100)));
}

#[test]
fn opening_balance_extends_available_in_current_cycle() {
    let mut s = funded();
    s.open_balance = dec!(500);
    let mut c = draft(d(2024, 3, 10), dec!(1400), "groceries");
    c.use_open_balance = true;
    assert_eq!(eval(&c, &s, None).unwrap(), Verdict::Accept);

    c.amount = dec!(1600);
    assert_eq!(eval(&c, &s, None).unwrap(), short(dec!(1600), dec!(1500)));
}

#[test]
fn opening_balance_refused_outside_current_cycle() {
    let mut s = funded();
    s.open_balance = dec!(500);
    let mut c = draft(d(2024, 2, 10), dec!(10), "groceries");
    c.use_open_balance = true;
    let err = eval(&c, &s, None).unwrap_err();
    assert_eq!(err, ValidationError::OpenBalanceOutsideCurrentCycle(d(2024, 3, 1)));
}

#[test]
fn decreasing_an_edit_in_place_always_passes_funds() {
    let mut s = base_snapshot();
    // Overspent cycle: remaining is -300.
    s.transactions.push(txn("t1", d(2024, 3, 5), dec!(300), "groceries"));
    let prior = s.transactions[0].clone();
    let c = draft(d(2024, 3, 20), dec!(100), "groceries");
    assert_eq!(eval(&c, &s, Some(&prior)).unwrap(), Verdict::Accept);
}

#[test]
fn increasing_an_edit_in_place_checks_only_the_delta() {
    let mut s = funded();
    s.transactions.push(txn("t1", d(2024, 3, 5), dec!(900), "groceries"));
    let prior = s.transactions[1].clone();
    // remaining is 100; +100 fits, +101 does not.
    let ok = eval(&draft(d(2024, 3, 5), dec!(1000), "groceries"), &s, Some(&prior)).unwrap();
    assert_eq!(ok, Verdict::Accept);
    let bad = eval(&draft(d(2024, 3, 5), dec!(1001), "groceries"), &s, Some(&prior)).unwrap();
    assert_eq!(bad, short(dec!(101), dec!(100)));
}

#[test]
fn changing_category_evaluates_full_amount() {
    let mut s = funded();
    s.transactions.push(txn("t1", d(2024, 3, 5), dec!(900), "groceries"));
    let prior = s.transactions[1].clone();
    let c = draft(d(2024, 3, 5), dec!(900), "investments");
    assert_eq!(eval(&c, &s, Some(&prior)).unwrap(), short(dec!(900), dec!(100)));
}

#[test]
fn moving_to_another_cycle_evaluates_full_amount() {
    let mut s = funded();
    s.transactions.push(txn("feb-pay", d(2024, 2, 1), dec!(2000), "salary"));
    s.transactions.push(txn("t1", d(2024, 2, 5), dec!(500), "groceries"));
    let prior = s.transactions[2].clone();
    // March remaining: 1500 carried + 1000 = 2500, so the full 500 fits.
    let c = draft(d(2024, 3, 5), dec!(500), "groceries");
    assert_eq!(eval(&c, &s, Some(&prior)).unwrap(), Verdict::Accept);
}

#[test]
fn dropping_opening_balance_moves_full_amount_onto_cycle() {
    let mut s = base_snapshot();
    s.open_balance = dec!(1000);
    let mut stored = txn("t1", d(2024, 3, 5), dec!(800), "groceries");
    stored.use_open_balance = true;
    s.transactions.push(stored.clone());

    // Same date, category and amount; only the flag changes.
    let c = draft(d(2024, 3, 5), dec!(800), "groceries");
    assert_eq!(eval(&c, &s, Some(&stored)).unwrap(), short(dec!(800), dec!(0)));
}

#[test]
fn switching_to_opening_balance_evaluates_full_amount() {
    let mut s = funded();
    s.open_balance = dec!(500);
    s.transactions.push(txn("t1", d(2024, 3, 5), dec!(900), "groceries"));
    let stored = s.transactions[1].clone();

    let mut c = draft(d(2024, 3, 5), dec!(900), "groceries");
    c.use_open_balance = true;
    // 100 left in the cycle plus 500 of opening balance.
    assert_eq!(eval(&c, &s, Some(&stored)).unwrap(), short(dec!(900), dec!(600)));

    s.open_balance = dec!(800);
    assert_eq!(eval(&c, &s, Some(&stored)).unwrap(), Verdict::Accept);
}

#[test]
fn deposit_turned_withdrawal_evaluates_full_amount() {
    let mut s = funded();
    let cat = with_goal(&mut s, "Trip", dec!(5000), dec!(200));
    let stored = txn("g1", d(2024, 3, 3), dec!(200), &cat);
    s.transactions.push(stored.clone());

    let mut c = draft(d(2024, 3, 3), dec!(250), &cat);
    c.kind = TxnKind::GoalWithdrawal;
    assert_eq!(
        eval(&c, &s, Some(&stored)).unwrap(),
        Verdict::Reject(Rejection::GoalWithdrawalExceedsSaved {
            goal: "Trip".into(),
            requested: dec!(250),
            saved: dec!(200),
        })
    );
}

#[test]
fn withdrawal_turned_deposit_evaluates_full_amount() {
    let mut s = base_snapshot();
    let cat = with_goal(&mut s, "Trip", dec!(5000), dec!(300));
    let mut stored = txn("w1", d(2024, 3, 3), dec!(100), &cat);
    stored.kind = TxnKind::GoalWithdrawal;
    s.transactions.push(stored.clone());

    // The stored withdrawal is the only inflow: 100 available.
    let c = draft(d(2024, 3, 3), dec!(150), &cat);
    assert_eq!(eval(&c, &s, Some(&stored)).unwrap(), short(dec!(150), dec!(100)));
}

#[test]
fn debt_payment_over_balance_is_rejected() {
    let mut s = funded();
    s.transactions.push(txn("more", d(2024, 3, 2), dec!(1000), "salary"));
    let cat = with_debt(&mut s, "Car", dec!(1000), DebtKind::Payable);

    let v = eval(&draft(d(2024, 3, 10), dec!(1200), &cat), &s, None).unwrap();
    assert_eq!(
        v,
        Verdict::Reject(Rejection::DebtPaymentExceedsBalance {
            debt: "Car".into(),
            payment: dec!(1200),
            balance: dec!(1000),
        })
    );
    let v = eval(&draft(d(2024, 3, 10), dec!(1000), &cat), &s, None).unwrap();
    assert_eq!(v, Verdict::Accept);
}

#[test]
fn receivable_claims_have_no_upper_bound() {
    let mut s = funded();
    let cat = with_debt(&mut s, "Sam", dec!(10), DebtKind::Receivable);
    let mut c = draft(d(2024, 3, 10), dec!(800), &cat);
    c.kind = TxnKind::DebtClaim;
    assert_eq!(eval(&c, &s, None).unwrap(), Verdict::Accept);
    // A claim is an outflow, so it still has to fit the budget.
    c.amount = dec!(1200);
    assert_eq!(eval(&c, &s, None).unwrap(), short(dec!(1200), dec!(1000)));
}

#[test]
fn claim_requires_receivable_debt() {
    let mut s = funded();
    let cat = with_debt(&mut s, "Car", dec!(1000), DebtKind::Payable);
    let mut c = draft(d(2024, 3, 10), dec!(10), &cat);
    c.kind = TxnKind::DebtClaim;
    let err = eval(&c, &s, None).unwrap_err();
    assert!(matches!(err, ValidationError::ClaimWithoutReceivable(_)));
}

#[test]
fn goal_deposit_overshoot_warns() {
    let mut s = funded();
    let cat = with_goal(&mut s, "Trip", dec!(5000), dec!(4800));
    let v = eval(&draft(d(2024, 3, 10), dec!(300), &cat), &s, None).unwrap();
    assert_eq!(
        v,
        Verdict::AcceptWithWarning(Notice::GoalExceeded {
            goal: "Trip".into(),
            over: dec!(100),
        })
    );
    let v = eval(&draft(d(2024, 3, 10), dec!(200), &cat), &s, None).unwrap();
    assert_eq!(
        v,
        Verdict::AcceptWithWarning(Notice::GoalReached { goal: "Trip".into() })
    );
}

#[test]
fn goal_withdrawal_limited_to_saved_amount() {
    let mut s = base_snapshot();
    let cat = with_goal(&mut s, "Trip", dec!(5000), dec!(250));
    let mut c = draft(d(2024, 3, 10), dec!(300), &cat);
    c.kind = TxnKind::GoalWithdrawal;
    assert_eq!(
        eval(&c, &s, None).unwrap(),
        Verdict::Reject(Rejection::GoalWithdrawalExceedsSaved {
            goal: "Trip".into(),
            requested: dec!(300),
            saved: dec!(250),
        })
    );
    c.amount = dec!(250);
    assert_eq!(eval(&c, &s, None).unwrap(), Verdict::Accept);
}

#[test]
fn goal_withdrawal_edit_checks_delta() {
    let mut s = base_snapshot();
    let cat = with_goal(&mut s, "Trip", dec!(5000), dec!(50));
    let mut stored = txn("w1", d(2024, 3, 3), dec!(200), &cat);
    stored.kind = TxnKind::GoalWithdrawal;
    s.transactions.push(stored.clone());
    let mut c = draft(d(2024, 3, 3), dec!(250), &cat);
    c.kind = TxnKind::GoalWithdrawal;
    assert_eq!(eval(&c, &s, Some(&stored)).unwrap(), Verdict::Accept);
    c.amount = dec!(251);
    let v = eval(&c, &s, Some(&stored)).unwrap();
    assert!(matches!(v, Verdict::Reject(Rejection::GoalWithdrawalExceedsSaved { .. })));
}

#[test]
fn withdrawal_requires_goal_category() {
    let s = funded();
    let mut c = draft(d(2024, 3, 10), dec!(10), "groceries");
    c.kind = TxnKind::GoalWithdrawal;
    let err = eval(&c, &s, None).unwrap_err();
    assert_eq!(err, ValidationError::WithdrawalWithoutGoal("groceries".into()));
}

#[test]
fn entries_stay_editable_after_their_goal_or_debt_is_removed() {
    let mut s = funded();
    let goal_cat = with_goal(&mut s, "Trip", dec!(5000), dec!(300));
    let debt_cat = with_debt(&mut s, "Sam", dec!(0), DebtKind::Receivable);
    let mut withdrawal = txn("w1", d(2024, 3, 3), dec!(100), &goal_cat);
    withdrawal.kind = TxnKind::GoalWithdrawal;
    let mut claim = txn("c1", d(2024, 3, 4), dec!(200), &debt_cat);
    claim.kind = TxnKind::DebtClaim;
    s.transactions.extend([withdrawal.clone(), claim.clone()]);
    s.goals.clear();
    s.debts.clear();

    let mut note_only = TransactionDraft::from(&withdrawal);
    note_only.note = Some("moved to checking".into());
    assert_eq!(eval(&note_only, &s, Some(&withdrawal)).unwrap(), Verdict::Accept);

    let mut note_only = TransactionDraft::from(&claim);
    note_only.note = Some("lent for rent".into());
    assert_eq!(eval(&note_only, &s, Some(&claim)).unwrap(), Verdict::Accept);

    // New claims on the orphaned category are still refused.
    let err = eval(&TransactionDraft::from(&claim), &s, None).unwrap_err();
    assert!(matches!(err, ValidationError::ClaimWithoutReceivable(_)));
}

#[test]
fn malformed_candidates_fail_validation() {
    let mut s = funded();
    let err = eval(&draft(d(2024, 3, 10), dec!(-1), "groceries"), &s, None).unwrap_err();
    assert_eq!(err, ValidationError::NegativeAmount(dec!(-1)));

    let err = eval(&draft(d(2024, 3, 10), dec!(1), "nope"), &s, None).unwrap_err();
    assert_eq!(err, ValidationError::UnknownCategory("nope".into()));

    s.categories[1].deleted = true;
    let err = eval(&draft(d(2024, 3, 10), dec!(1), "groceries"), &s, None).unwrap_err();
    assert_eq!(err, ValidationError::DeletedCategory("groceries".into()));
}

#[test]
fn deleted_category_stays_editable_for_existing_entries() {
    let mut s = funded();
    s.transactions.push(txn("t1", d(2024, 3, 5), dec!(100), "groceries"));
    s.categories[1].deleted = true;
    let prior = s.transactions[1].clone();
    let c = draft(d(2024, 3, 5), dec!(90), "groceries");
    assert_eq!(eval(&c, &s, Some(&prior)).unwrap(), Verdict::Accept);
}

#[test]
fn zero_amount_is_valid() {
    let s = base_snapshot();
    let v = eval(&draft(d(2024, 3, 10), Decimal::ZERO, "groceries"), &s, None).unwrap();
    assert_eq!(v, Verdict::Accept);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use koinfo::commands::{doctor, snapshot, Clock};
use koinfo::db;
use koinfo::engine::{remaining_this_month, AnchorDay};
use koinfo::models::{DebtKind, Snapshot, TxnKind};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::io::Write;

const LEGACY: &str = r#"{
  "categories": [
    {"id": "c-salary", "name": "Salary", "type": "income", "deleted": false},
    {"id": "c-food", "name": "Groceries", "type": "expense"},
    {"id": "c-loan", "name": "Sam - Debt", "type": "income", "deleted": false},
    {"id": "c-trip", "name": "Trip - Goal", "type": "saving", "deleted": false}
  ],
  "transactions": [
    {"id": "t1", "date": "2024-03-01", "amount": 1500.5, "category_id": "c-salary", "note": ""},
    {"id": "t2", "date": "2024-03-03", "amount": 200.25, "category_id": "c-food",
     "note": "market", "use_open_balance": true},
    {"id": "t3", "date": "2024-03-04", "amount": 50, "category_id": "c-loan", "debt_claim": true},
    {"id": "t4", "date": "2024-03-05", "amount": 20, "category_id": "c-trip", "goal_withdrawal": true}
  ],
  "debts": [
    {"id": "d1", "name": "Sam", "balance": 50.0, "kind": "receivable", "linked_category_id": "c-loan"}
  ],
  "goals": [
    {"id": "g1", "name": "Trip", "target": 1000.0, "current": 80.0, "deadline": "2025-06-01",
     "created": "2024-01-10", "linked_category_id": "c-trip"}
  ],
  "open_balance": 300.0
}"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

fn clock() -> Clock {
    Clock {
        today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        anchor: AnchorDay::FIRST,
    }
}

#[test]
fn reads_legacy_json_shape() {
    let f = write_temp(LEGACY);
    let s = snapshot::read_json(f.path()).unwrap();

    assert_eq!(s.categories.len(), 4);
    assert!(!s.categories[1].deleted);
    assert_eq!(s.transactions[0].amount, dec!(1500.5));
    assert_eq!(s.transactions[0].note, None);
    assert_eq!(s.transactions[1].note.as_deref(), Some("market"));
    assert!(s.transactions[1].use_open_balance);
    assert_eq!(s.transactions[2].kind, TxnKind::DebtClaim);
    assert_eq!(s.transactions[3].kind, TxnKind::GoalWithdrawal);
    assert_eq!(s.debts[0].kind, DebtKind::Receivable);
    assert_eq!(s.goals[0].current, dec!(80));
    assert_eq!(s.goals[0].completed_at, None);
    assert_eq!(s.open_balance, dec!(300));

    // Salary 1500.5, claim -50, withdrawal +20; the opening-balance spend is excluded.
    let summary = remaining_this_month(&s, AnchorDay::FIRST, clock().today);
    assert_eq!(summary.remaining, dec!(1470.5));
    assert!(doctor::issues(&s, &clock()).is_empty());
}

#[test]
fn missing_sections_default_to_empty() {
    let f = write_temp(r#"{"categories": []}"#);
    let s = snapshot::read_json(f.path()).unwrap();
    assert_eq!(s, Snapshot::default());
}

#[test]
fn conflicting_flags_are_refused() {
    let f = write_temp(
        r#"{"transactions": [{"id": "x", "date": "2024-03-01", "amount": 1,
            "category_id": "c", "debt_claim": true, "goal_withdrawal": true}]}"#,
    );
    let err = snapshot::read_json(f.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("both a debt claim and a goal withdrawal"));
}

#[test]
fn import_then_export_preserves_data() {
    let f = write_temp(LEGACY);
    let imported = snapshot::read_json(f.path()).unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::seed_defaults(&conn).unwrap();
    db::replace_snapshot(&mut conn, &imported).unwrap();

    let out = tempfile::NamedTempFile::new().unwrap();
    snapshot::write_json(out.path(), &db::load_snapshot(&conn).unwrap()).unwrap();
    let mut reloaded = snapshot::read_json(out.path()).unwrap();

    let mut expected = imported.clone();
    expected.categories.sort_by(|a, b| a.name.cmp(&b.name));
    reloaded.categories.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(reloaded, expected);
}

#[test]
fn reset_restores_default_categories() {
    let f = write_temp(LEGACY);
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::replace_snapshot(&mut conn, &snapshot::read_json(f.path()).unwrap()).unwrap();

    db::replace_snapshot(&mut conn, &snapshot::default_snapshot()).unwrap();
    let s = db::load_snapshot(&conn).unwrap();
    assert_eq!(s.categories.len(), 3);
    assert!(s.transactions.is_empty());
    assert!(s.debts.is_empty());
    assert!(s.goals.is_empty());
    assert_eq!(s.open_balance, dec!(0));
}

#[test]
fn doctor_reports_inconsistencies() {
    let f = write_temp(LEGACY);
    let mut s = snapshot::read_json(f.path()).unwrap();
    s.transactions[0].category_id = "gone".into();
    s.transactions[1].date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
    s.open_balance = dec!(100);
    s.debts[0].linked_category_id = None;

    let codes: Vec<String> = doctor::issues(&s, &clock())
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(
        codes,
        vec![
            "txn_unknown_category",
            "txn_future_cycle",
            "open_balance_below_used",
            "debt_unlinked",
        ]
    );
}

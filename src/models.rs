// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::error::ValidationError;

/// Economic direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Income,
    Expense,
    Saving,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Income => "income",
            FlowType::Expense => "expense",
            FlowType::Saving => "saving",
        }
    }

    pub fn is_outflow(&self) -> bool {
        matches!(self, FlowType::Expense | FlowType::Saving)
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(FlowType::Income),
            "expense" => Ok(FlowType::Expense),
            "saving" => Ok(FlowType::Saving),
            other => Err(anyhow::anyhow!(
                "Invalid category type '{}', expected income|expense|saving",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub r#type: FlowType,
    #[serde(default)]
    pub deleted: bool,
}

/// Special semantics of a transaction against a debt- or goal-linked category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnKind {
    #[default]
    Plain,
    /// Money lent out against a receivable debt.
    DebtClaim,
    /// Money taken back out of a savings goal.
    GoalWithdrawal,
}

impl TxnKind {
    pub fn from_flags(debt_claim: bool, goal_withdrawal: bool) -> Result<Self, ValidationError> {
        match (debt_claim, goal_withdrawal) {
            (false, false) => Ok(TxnKind::Plain),
            (true, false) => Ok(TxnKind::DebtClaim),
            (false, true) => Ok(TxnKind::GoalWithdrawal),
            (true, true) => Err(ValidationError::ConflictingFlags),
        }
    }

    pub fn is_debt_claim(&self) -> bool {
        matches!(self, TxnKind::DebtClaim)
    }

    pub fn is_goal_withdrawal(&self) -> bool {
        matches!(self, TxnKind::GoalWithdrawal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Plain => "plain",
            TxnKind::DebtClaim => "claim",
            TxnKind::GoalWithdrawal => "withdrawal",
        }
    }
}

impl FromStr for TxnKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(TxnKind::Plain),
            "claim" | "debt_claim" => Ok(TxnKind::DebtClaim),
            "withdrawal" | "goal_withdrawal" => Ok(TxnKind::GoalWithdrawal),
            other => Err(anyhow::anyhow!(
                "Invalid transaction kind '{}', expected plain|claim|withdrawal",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: String,
    pub note: Option<String>,
    pub use_open_balance: bool,
    pub kind: TxnKind,
}

/// Stored shape of a transaction: the kind is spread over two flags.
#[derive(Serialize, Deserialize)]
struct TransactionRecord {
    id: String,
    date: NaiveDate,
    amount: Decimal,
    category_id: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    use_open_balance: bool,
    #[serde(default)]
    debt_claim: bool,
    #[serde(default)]
    goal_withdrawal: bool,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ValidationError;

    fn try_from(r: TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Transaction {
            kind: TxnKind::from_flags(r.debt_claim, r.goal_withdrawal)?,
            id: r.id,
            date: r.date,
            amount: r.amount,
            category_id: r.category_id,
            note: r.note.filter(|n| !n.is_empty()),
            use_open_balance: r.use_open_balance,
        })
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(t: Transaction) -> Self {
        TransactionRecord {
            id: t.id,
            date: t.date,
            amount: t.amount,
            category_id: t.category_id,
            note: t.note,
            use_open_balance: t.use_open_balance,
            debt_claim: t.kind.is_debt_claim(),
            goal_withdrawal: t.kind.is_goal_withdrawal(),
        }
    }
}

/// Candidate fields of a create or update, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: String,
    pub note: Option<String>,
    pub use_open_balance: bool,
    pub kind: TxnKind,
}

impl TransactionDraft {
    pub fn into_transaction(self, id: impl Into<String>) -> Transaction {
        Transaction {
            id: id.into(),
            date: self.date,
            amount: self.amount,
            category_id: self.category_id,
            note: self.note,
            use_open_balance: self.use_open_balance,
            kind: self.kind,
        }
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(t: &Transaction) -> Self {
        TransactionDraft {
            date: t.date,
            amount: t.amount,
            category_id: t.category_id.clone(),
            note: t.note.clone(),
            use_open_balance: t.use_open_balance,
            kind: t.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    /// We owe this money.
    #[default]
    Payable,
    /// This money is owed to us.
    Receivable,
}

impl DebtKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtKind::Payable => "payable",
            DebtKind::Receivable => "receivable",
        }
    }

    /// Flow type of the category created alongside a debt of this kind.
    pub fn linked_flow(&self) -> FlowType {
        match self {
            DebtKind::Payable => FlowType::Expense,
            DebtKind::Receivable => FlowType::Income,
        }
    }
}

impl FromStr for DebtKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "payable" => Ok(DebtKind::Payable),
            "receivable" => Ok(DebtKind::Receivable),
            other => Err(anyhow::anyhow!(
                "Invalid debt kind '{}', expected payable|receivable",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: Decimal,
    #[serde(default)]
    pub kind: DebtKind,
    pub linked_category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: Decimal,
    #[serde(default)]
    pub current: Decimal,
    pub deadline: NaiveDate,
    pub created: NaiveDate,
    #[serde(default)]
    pub completed_at: Option<NaiveDate>,
    pub linked_category_id: Option<String>,
}

/// The full data set the engine evaluates against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub open_balance: Decimal,
}

pub type CategoryIndex<'a> = HashMap<&'a str, &'a Category>;

impl Snapshot {
    pub fn category_index(&self) -> CategoryIndex<'_> {
        self.categories.iter().map(|c| (c.id.as_str(), c)).collect()
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn debt_for_category(&self, category_id: &str) -> Option<&Debt> {
        self.debts
            .iter()
            .find(|d| d.linked_category_id.as_deref() == Some(category_id))
    }

    pub fn goal_for_category(&self, category_id: &str) -> Option<&Goal> {
        self.goals
            .iter()
            .find(|g| g.linked_category_id.as_deref() == Some(category_id))
    }

    pub fn is_linked(&self, category_id: &str) -> bool {
        self.debt_for_category(category_id).is_some()
            || self.goal_for_category(category_id).is_some()
    }
}

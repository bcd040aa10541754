//! Cash Flow & Budgets

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Always positive; the direction comes from `kind`
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    pub label: String,
}

impl Transaction {
    /// Signed amount: positive for income, negative for expenses
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub label: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(EngineError::InvalidInput("transaction label is required".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(EngineError::InvalidInput("transaction amount must be positive".into()));
        }
        Ok(())
    }

    pub fn into_transaction(self, id: impl Into<String>) -> Transaction {
        Transaction {
            id: id.into(),
            date: self.date.unwrap_or_else(Utc::now),
            amount: self.amount,
            kind: self.kind,
            category: self.category.trim().to_string(),
            label: self.label.trim().to_string(),
        }
    }
}

/// Income, expenses and their difference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

pub fn summarize(transactions: &[Transaction]) -> CashFlowSummary {
    let total = |kind: TransactionKind| -> Decimal {
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    };

    let income = total(TransactionKind::Income);
    let expenses = total(TransactionKind::Expense);

    CashFlowSummary {
        income,
        expenses,
        net: income - expenses,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub limit: Decimal,
    #[serde(default)]
    pub spent: Decimal,
}

impl Budget {
    /// Spent share of the limit, in percent, capped at 100
    pub fn utilisation(&self) -> Decimal {
        if self.limit <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.spent / self.limit * dec!(100)).min(dec!(100))
    }

    pub fn is_exceeded(&self) -> bool {
        self.spent > self.limit
    }
}

/// Recompute each budget's `spent` from expenses in its category (case-insensitive)
pub fn apply_spending(budgets: &mut [Budget], transactions: &[Transaction]) {
    for budget in budgets.iter_mut() {
        budget.spent = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense && t.category.eq_ignore_ascii_case(&budget.category))
            .map(|t| t.amount)
            .sum();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub limit: Decimal,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(EngineError::InvalidInput("budget category is required".into()));
        }
        if self.limit <= Decimal::ZERO {
            return Err(EngineError::InvalidInput("budget limit must be positive".into()));
        }
        Ok(())
    }

    pub fn into_budget(self, id: impl Into<String>) -> Budget {
        Budget {
            id: id.into(),
            category: self.category.trim().to_string(),
            limit: self.limit,
            spent: Decimal::ZERO,
        }
    }
}

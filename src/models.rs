// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stored in place of an empty comment.
pub const NO_COMMENT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::validation(
                "type",
                format!("'{}' is not one of Income, Expense", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub comment: String,
}

/// A recurring monthly transaction definition.
///
/// `last_generated_date` is the cursor: the date of the newest occurrence
/// already written to the transactions table (or `start_date` when nothing
/// has been generated yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: i64,
    pub start_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub comment: String,
    pub last_generated_date: NaiveDate,
}

impl RecurringTemplate {
    /// Day of month every occurrence is generated on (clamped in short months).
    pub fn anchor_day(&self) -> u32 {
        self.start_date.day()
    }

    /// The fields copied onto every generated transaction.
    pub fn draft(&self, date: NaiveDate) -> TransactionDraft {
        TransactionDraft {
            date,
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            comment: Some(self.comment.clone()),
        }
    }
}

/// User-supplied transaction fields, used for inserts and full-record updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub comment: Option<String>,
}

impl TransactionDraft {
    /// Checks the fields and applies the storage conventions: expenses are
    /// negative, income is positive, a blank comment becomes [`NO_COMMENT`].
    pub fn validate(self) -> Result<TransactionDraft> {
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(Error::validation("category", "must not be empty"));
        }
        if self.amount.is_zero() {
            return Err(Error::validation("amount", "must be non-zero"));
        }
        let amount = match self.kind {
            TransactionType::Expense => -self.amount.abs(),
            TransactionType::Income if self.amount.is_sign_negative() => {
                return Err(Error::validation(
                    "amount",
                    format!("income amount {} must be positive", self.amount),
                ));
            }
            TransactionType::Income => self.amount,
        };
        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_COMMENT.to_string());
        Ok(TransactionDraft {
            date: self.date,
            kind: self.kind,
            category,
            amount,
            comment: Some(comment),
        })
    }

    pub fn comment_or_default(&self) -> &str {
        self.comment.as_deref().unwrap_or(NO_COMMENT)
    }

    /// The stored record once the store has assigned `id`.
    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            date: self.date,
            kind: self.kind,
            comment: self
                .comment
                .unwrap_or_else(|| NO_COMMENT.to_string()),
            category: self.category,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryThreshold {
    pub category: String,
    pub monthly_limit: Decimal,
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly spending limits per category.

use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{CategoryThreshold, TransactionType};
use crate::store::{self, TransactionQuery};
use crate::utils::{days_in_month, first_of_month};

/// Raised when an expense would push a category over its monthly limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdWarning {
    pub category: String,
    pub limit: Decimal,
    /// Spent so far this month, before the new expense.
    pub current_total: Decimal,
    pub new_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
}

pub fn set_threshold(conn: &Connection, category: &str, limit: Decimal) -> Result<()> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::validation("category", "must not be empty"));
    }
    if limit.is_sign_negative() && !limit.is_zero() {
        return Err(Error::validation(
            "monthly limit",
            format!("{} must not be negative", limit),
        ));
    }
    conn.execute(
        "INSERT INTO category_thresholds(category, monthly_limit) VALUES (?1, ?2)
         ON CONFLICT(category) DO UPDATE SET monthly_limit=excluded.monthly_limit",
        params![category, limit.to_string()],
    )?;
    Ok(())
}

pub fn thresholds(conn: &Connection) -> Result<Vec<CategoryThreshold>> {
    let mut stmt =
        conn.prepare("SELECT category, monthly_limit FROM category_thresholds ORDER BY category")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut data = Vec::new();
    for row in rows {
        let (category, raw) = row?;
        let monthly_limit = parse_limit(&category, &raw)?;
        data.push(CategoryThreshold {
            category,
            monthly_limit,
        });
    }
    Ok(data)
}

pub fn threshold_for(conn: &Connection, category: &str) -> Result<Option<Decimal>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT monthly_limit FROM category_thresholds WHERE category=?1",
            params![category],
            |r| r.get(0),
        )
        .optional()?;
    raw.map(|raw| parse_limit(category, &raw)).transpose()
}

fn parse_limit(category: &str, raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|_| Error::Corrupt(format!("threshold for '{}': bad limit '{}'", category, raw)))
}

/// Sum of expense magnitudes in `category` between `from` and `to`, inclusive.
pub fn expenses_between(
    conn: &Connection,
    category: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Decimal> {
    let query = TransactionQuery {
        from: Some(from),
        to: Some(to),
        category: Some(category.to_string()),
        kind: Some(TransactionType::Expense),
        ..Default::default()
    };
    Ok(store::query_transactions(conn, &query)?
        .iter()
        .map(|t| t.amount.abs())
        .sum())
}

/// Checks an expense of `amount` on `date` against the category's limit.
///
/// Counts spending from the first of `date`'s month up to `date`. A missing
/// or zero limit never warns.
pub fn check_threshold(
    conn: &Connection,
    category: &str,
    amount: Decimal,
    date: NaiveDate,
) -> Result<Option<ThresholdWarning>> {
    let limit = match threshold_for(conn, category)? {
        Some(limit) if limit > Decimal::ZERO => limit,
        _ => return Ok(None),
    };
    let month_start = first_of_month(date.year(), date.month())
        .ok_or_else(|| Error::validation("date", format!("{} has no month start", date)))?;
    let current_total = expenses_between(conn, category, month_start, date)?;
    let new_total = current_total + amount.abs();
    if new_total > limit {
        return Ok(Some(ThresholdWarning {
            category: category.to_string(),
            limit,
            current_total,
            new_total,
        }));
    }
    Ok(None)
}

pub fn monthly_spending(conn: &Connection, category: &str, year: i32, month: u32) -> Result<Decimal> {
    let (start, end) = month_range(year, month)?;
    expenses_between(conn, category, start, end)
}

/// Budget against spending for every category with a limit, for one month.
pub fn budget_summary(conn: &Connection, year: i32, month: u32) -> Result<Vec<BudgetStatus>> {
    let mut data = Vec::new();
    for t in thresholds(conn)? {
        let spent = monthly_spending(conn, &t.category, year, month)?;
        data.push(budget_status(t.category, t.monthly_limit, spent));
    }
    Ok(data)
}

pub fn budget_status(category: String, budget: Decimal, spent: Decimal) -> BudgetStatus {
    let remaining = (budget - spent).max(Decimal::ZERO);
    let percentage = if budget > Decimal::ZERO {
        (spent / budget * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };
    BudgetStatus {
        category,
        budget,
        spent,
        remaining,
        percentage,
    }
}

fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::validation("month", format!("{}-{:02} is not a month", year, month));
    let start = first_of_month(year, month).ok_or_else(invalid)?;
    let last = days_in_month(year, month).ok_or_else(invalid)?;
    let end = start.with_day(last).ok_or_else(invalid)?;
    Ok((start, end))
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only monthly and yearly summaries over the transaction store.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::budgets::{self, BudgetStatus};
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};
use crate::store::{self, TransactionQuery};
use crate::utils::{days_in_month, first_of_month};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAmount {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    /// Magnitude of all expenses.
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
    /// Expense magnitude per category, largest first.
    pub category_breakdown: Vec<CategoryAmount>,
    pub daily_expenses: Vec<DailyAmount>,
    pub budget_status: Vec<BudgetStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    /// Change of `net` against the previous month, in percent.
    pub growth_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyReport {
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
    pub monthly_avg_income: Decimal,
    pub monthly_avg_expenses: Decimal,
    pub category_breakdown: Vec<CategoryAmount>,
    /// Always twelve entries, January first.
    pub monthly_breakdown: Vec<MonthTotals>,
}

pub fn monthly_report(conn: &Connection, year: i32, month: u32) -> Result<MonthlyReport> {
    let invalid = || Error::validation("month", format!("{}-{:02} is not a month", year, month));
    let start = first_of_month(year, month).ok_or_else(invalid)?;
    let end = start
        .with_day(days_in_month(year, month).ok_or_else(invalid)?)
        .ok_or_else(invalid)?;
    let txs = transactions_between(conn, start, end)?;

    let (total_income, total_expenses) = totals(&txs);
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in expenses(&txs) {
        *daily.entry(t.date).or_insert(Decimal::ZERO) += t.amount.abs();
    }

    Ok(MonthlyReport {
        year,
        month,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        transaction_count: txs.len(),
        category_breakdown: category_breakdown(&txs),
        daily_expenses: daily
            .into_iter()
            .map(|(date, amount)| DailyAmount { date, amount })
            .collect(),
        budget_status: budgets::budget_summary(conn, year, month)?,
    })
}

pub fn yearly_report(conn: &Connection, year: i32) -> Result<YearlyReport> {
    let invalid = || Error::validation("year", format!("{} is out of range", year));
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    let txs = transactions_between(conn, start, end)?;

    let (total_income, total_expenses) = totals(&txs);
    let twelve = Decimal::from(12);

    let mut monthly_breakdown: Vec<MonthTotals> = Vec::with_capacity(12);
    for month in 1..=12 {
        let in_month: Vec<Transaction> = txs
            .iter()
            .filter(|t| t.date.month() == month)
            .cloned()
            .collect();
        let (income, expenses) = totals(&in_month);
        let net = income - expenses;
        let growth_pct = monthly_breakdown
            .last()
            .filter(|prev| !prev.net.is_zero())
            .map(|prev| ((net - prev.net) / prev.net.abs() * Decimal::ONE_HUNDRED).round_dp(2));
        monthly_breakdown.push(MonthTotals {
            month,
            income,
            expenses,
            net,
            growth_pct,
        });
    }

    Ok(YearlyReport {
        year,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        transaction_count: txs.len(),
        monthly_avg_income: (total_income / twelve).round_dp(2),
        monthly_avg_expenses: (total_expenses / twelve).round_dp(2),
        category_breakdown: category_breakdown(&txs),
        monthly_breakdown,
    })
}

fn transactions_between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
    store::query_transactions(
        conn,
        &TransactionQuery {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        },
    )
}

fn expenses(txs: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    txs.iter().filter(|t| t.kind == TransactionType::Expense)
}

/// (income, expense magnitude) over `txs`.
pub fn totals(txs: &[Transaction]) -> (Decimal, Decimal) {
    let income: Decimal = txs
        .iter()
        .filter(|t| t.kind == TransactionType::Income)
        .map(|t| t.amount)
        .sum();
    let spent: Decimal = expenses(txs).map(|t| t.amount.abs()).sum();
    (income, spent)
}

fn category_breakdown(txs: &[Transaction]) -> Vec<CategoryAmount> {
    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    for t in expenses(txs) {
        *by_category.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount.abs();
    }
    let mut items: Vec<CategoryAmount> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category: category.to_string(),
            amount,
        })
        .collect();
    // BTreeMap order makes ties alphabetical; the sort is stable.
    items.sort_by(|a, b| b.amount.cmp(&a.amount));
    items
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Materialization of recurring monthly templates into dated transactions.
//!
//! Each template carries a cursor (`last_generated_date`). A pass walks the
//! cursor forward one month at a time until the next occurrence would fall
//! after `today`, writing one transaction per step. The insert and the cursor
//! move for a step share a single SQLite transaction, so a crash leaves
//! either both or neither behind and a later pass resumes exactly where the
//! last committed step stopped.

use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::models::{RecurringTemplate, Transaction};
use crate::store;
use crate::utils::days_in_month;

/// The occurrence following `cursor` for a template anchored on `anchor_day`.
///
/// Steps into the next calendar month and uses `anchor_day` there, clamped
/// to the month's last day (an anchor of 31 lands on 02-28/29, 04-30, ...).
/// Returns `None` only when the result would fall outside chrono's range.
pub fn advance_one_month(cursor: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
    let next_month = cursor.with_day(1)?.checked_add_months(Months::new(1))?;
    let last_day = days_in_month(next_month.year(), next_month.month())?;
    next_month.with_day(anchor_day.clamp(1, last_day))
}

/// Occurrence dates due for `template` up to and including `today`, oldest first.
pub fn due_dates(template: &RecurringTemplate, today: NaiveDate) -> Vec<NaiveDate> {
    let anchor_day = template.anchor_day();
    let mut dates = Vec::new();
    let mut cursor = template.last_generated_date;
    while let Some(next) = advance_one_month(cursor, anchor_day) {
        if next > today {
            break;
        }
        dates.push(next);
        cursor = next;
    }
    dates
}

#[derive(Debug)]
pub struct TemplateFailure {
    pub template_id: i64,
    pub error: Error,
}

/// Outcome of one materialization pass.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Newly written transactions, grouped by template and in date order within a template.
    pub generated: Vec<Transaction>,
    /// Templates that were skipped or stopped early during this pass.
    pub failures: Vec<TemplateFailure>,
}

impl MaterializeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Brings every template up to date with `today`.
///
/// A template that cannot be decoded or fails to commit is logged, recorded
/// in the report and left for the next pass; the remaining templates are
/// still processed. Only a failure to read the template table aborts the
/// whole pass.
pub fn materialize(conn: &mut Connection, today: NaiveDate) -> Result<MaterializeReport> {
    let rows = store::template_rows(conn)?;
    let mut report = MaterializeReport::default();

    for row in rows {
        let template_id = row.id;
        let outcome = row
            .parse()
            .and_then(|template| catch_up(conn, &template, today, &mut report.generated));
        if let Err(error) = outcome {
            tracing::warn!(template_id, %error, "skipping recurring template for this pass");
            report.failures.push(TemplateFailure { template_id, error });
        }
    }

    if !report.generated.is_empty() || !report.failures.is_empty() {
        tracing::info!(
            %today,
            generated = report.generated.len(),
            failed = report.failures.len(),
            "materialized recurring transactions"
        );
    }
    Ok(report)
}

fn catch_up(
    conn: &mut Connection,
    template: &RecurringTemplate,
    today: NaiveDate,
    generated: &mut Vec<Transaction>,
) -> Result<()> {
    let anchor_day = template.anchor_day();
    let mut cursor = template.last_generated_date;

    loop {
        let due = advance_one_month(cursor, anchor_day).ok_or_else(|| Error::InvalidTemplate {
            id: template.id,
            reason: format!("no occurrence representable after {}", cursor),
        })?;
        if due > today {
            return Ok(());
        }

        let draft = template
            .draft(due)
            .validate()
            .map_err(|e| Error::InvalidTemplate {
                id: template.id,
                reason: e.to_string(),
            })?;

        // Dropping `tx` without commit rolls both writes back.
        let tx = conn.transaction()?;
        let transaction_id = store::insert_transaction(&tx, &draft)?;
        if !store::advance_cursor(&tx, template.id, cursor, due)? {
            return Err(Error::InvalidTemplate {
                id: template.id,
                reason: format!("cursor is no longer at {} (template changed or removed)", cursor),
            });
        }
        tx.commit()?;

        tracing::debug!(
            template_id = template.id,
            transaction_id,
            date = %due,
            "generated recurring transaction"
        );
        generated.push(draft.into_transaction(transaction_id));
        cursor = due;
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entry points used by the CLI (or any other front end).
//!
//! Writes are validated here before they reach the store. Reading the
//! transaction list first materializes every due recurring occurrence.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Transaction, TransactionDraft};
use crate::recurrence::{self, MaterializeReport};
use crate::store::{self, TransactionQuery};

/// Result of [`list_transactions`].
#[derive(Debug)]
pub struct Listing {
    pub transactions: Vec<Transaction>,
    /// What the materialization pass that preceded the query did.
    pub materialized: MaterializeReport,
}

pub fn list_transactions(
    conn: &mut Connection,
    today: NaiveDate,
    query: &TransactionQuery,
) -> Result<Listing> {
    let materialized = recurrence::materialize(conn, today)?;
    let transactions = store::query_transactions(conn, query)?;
    Ok(Listing {
        transactions,
        materialized,
    })
}

pub fn add_transaction(conn: &Connection, draft: TransactionDraft) -> Result<i64> {
    let draft = draft.validate()?;
    let id = store::insert_transaction(conn, &draft)?;
    tracing::info!(id, date = %draft.date, kind = %draft.kind, amount = %draft.amount, "added transaction");
    Ok(id)
}

/// Registers a monthly template anchored on `draft.date`.
///
/// Nothing is generated here; the first occurrence (one month after the
/// anchor) appears on the next listing once it is due.
pub fn add_recurring_template(conn: &Connection, draft: TransactionDraft) -> Result<i64> {
    let draft = draft.validate()?;
    let id = store::insert_template(conn, &draft)?;
    tracing::info!(id, start = %draft.date, kind = %draft.kind, amount = %draft.amount, "added recurring template");
    Ok(id)
}

pub fn update_transaction(conn: &Connection, id: i64, draft: TransactionDraft) -> Result<bool> {
    let draft = draft.validate()?;
    let updated = store::update_transaction(conn, id, &draft)?;
    if !updated {
        tracing::warn!(id, "update of unknown transaction");
    }
    Ok(updated)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = store::delete_transaction(conn, id)?;
    if !deleted {
        tracing::warn!(id, "delete of unknown transaction");
    }
    Ok(deleted)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    store::get_transaction(conn, id)
}

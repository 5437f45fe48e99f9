// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed transaction and recurring-template stores.
//!
//! Every function takes a plain `&Connection` so that callers can run it
//! inside a `rusqlite::Transaction` (which derefs to `Connection`) when a
//! group of writes has to commit together.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{RecurringTemplate, Transaction, TransactionDraft, TransactionType};

/// Order of transactions returned by [`query_transactions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first, ties broken by id.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

/// Filters for [`query_transactions`]. The default selects everything, oldest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Earliest date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub to: Option<NaiveDate>,
    /// Exact category match.
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
    /// Case-insensitive substring match over comment and category. `%` and
    /// `_` match themselves.
    pub search: Option<String>,
    /// Lower bound on the absolute amount. Ignored unless positive.
    pub min_amount: Option<Decimal>,
    /// Upper bound on the absolute amount. Ignored unless positive.
    pub max_amount: Option<Decimal>,
    pub limit: Option<usize>,
    pub sort: SortOrder,
}

pub fn insert_transaction(conn: &Connection, draft: &TransactionDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(date, type, category, amount, comment)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.date.to_string(),
            draft.kind.as_str(),
            draft.category,
            draft.amount.to_string(),
            draft.comment_or_default(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Replaces every field of transaction `id`. Returns false if no such row exists.
pub fn update_transaction(conn: &Connection, id: i64, draft: &TransactionDraft) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE transactions SET date=?1, type=?2, category=?3, amount=?4, comment=?5
         WHERE id=?6",
        params![
            draft.date.to_string(),
            draft.kind.as_str(),
            draft.category,
            draft.amount.to_string(),
            draft.comment_or_default(),
            id
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    Ok(changed > 0)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let raw = conn
        .query_row(
            "SELECT id, date, type, category, amount, comment FROM transactions WHERE id=?1",
            params![id],
            raw_transaction,
        )
        .optional()?;
    raw.map(decode_transaction).transpose()
}

pub fn query_transactions(conn: &Connection, query: &TransactionQuery) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, date, type, category, amount, comment FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(from) = query.from {
        sql.push_str(" AND date >= ?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = query.to {
        sql.push_str(" AND date <= ?");
        params_vec.push(to.to_string());
    }
    if let Some(cat) = &query.category {
        sql.push_str(" AND category = ?");
        params_vec.push(cat.clone());
    }
    if let Some(kind) = query.kind {
        sql.push_str(" AND type = ?");
        params_vec.push(kind.as_str().to_string());
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        sql.push_str(" AND (comment LIKE ? ESCAPE '\\' OR category LIKE ? ESCAPE '\\')");
        let pattern = format!("%{}%", escape_like(term));
        params_vec.push(pattern.clone());
        params_vec.push(pattern);
    }
    if let Some(min) = query.min_amount.filter(|m| *m > Decimal::ZERO) {
        sql.push_str(" AND ABS(CAST(amount AS REAL)) >= CAST(? AS REAL)");
        params_vec.push(min.to_string());
    }
    if let Some(max) = query.max_amount.filter(|m| *m > Decimal::ZERO) {
        sql.push_str(" AND ABS(CAST(amount AS REAL)) <= CAST(? AS REAL)");
        params_vec.push(max.to_string());
    }
    match query.sort {
        SortOrder::Ascending => sql.push_str(" ORDER BY date ASC, id ASC"),
        SortOrder::Descending => sql.push_str(" ORDER BY date DESC, id DESC"),
    }
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), raw_transaction)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(decode_transaction(row?)?);
    }
    Ok(data)
}

/// Escapes `LIKE` wildcards so `term` matches literally under `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

type RawTransaction = (i64, String, String, String, String, String);

fn raw_transaction(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn decode_transaction(raw: RawTransaction) -> Result<Transaction> {
    let (id, date, kind, category, amount, comment) = raw;
    let corrupt = |what: &str, value: &str| {
        Error::Corrupt(format!("transaction {}: bad {} '{}'", id, what, value))
    };
    Ok(Transaction {
        id,
        date: parse_stored_date(&date).ok_or_else(|| corrupt("date", &date))?,
        kind: kind.parse::<TransactionType>().map_err(|_| corrupt("type", &kind))?,
        category,
        amount: amount.parse::<Decimal>().map_err(|_| corrupt("amount", &amount))?,
        comment,
    })
}

fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Inserts a template anchored on `draft.date`, with the cursor at the anchor.
pub fn insert_template(conn: &Connection, draft: &TransactionDraft) -> Result<i64> {
    let start = draft.date.to_string();
    conn.execute(
        "INSERT INTO recurring_templates
            (start_date, type, category, amount, comment, last_generated_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?1)",
        params![
            start,
            draft.kind.as_str(),
            draft.category,
            draft.amount.to_string(),
            draft.comment_or_default(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A template row as stored, before any field is decoded.
#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub id: i64,
    pub start_date: String,
    pub kind: String,
    pub category: String,
    pub amount: String,
    pub comment: String,
    pub last_generated_date: String,
}

impl TemplateRow {
    pub fn parse(self) -> Result<RecurringTemplate> {
        let id = self.id;
        let invalid = |reason: String| Error::InvalidTemplate { id, reason };

        let start_date = parse_stored_date(&self.start_date)
            .ok_or_else(|| invalid(format!("bad start_date '{}'", self.start_date)))?;
        let last_generated_date = parse_stored_date(&self.last_generated_date).ok_or_else(|| {
            invalid(format!(
                "bad last_generated_date '{}'",
                self.last_generated_date
            ))
        })?;
        if last_generated_date < start_date {
            return Err(invalid(format!(
                "cursor {} is before start date {}",
                last_generated_date, start_date
            )));
        }
        let kind = self
            .kind
            .parse::<TransactionType>()
            .map_err(|_| invalid(format!("bad type '{}'", self.kind)))?;
        let amount = self
            .amount
            .parse::<Decimal>()
            .map_err(|_| invalid(format!("bad amount '{}'", self.amount)))?;

        Ok(RecurringTemplate {
            id,
            start_date,
            kind,
            category: self.category,
            amount,
            comment: self.comment,
            last_generated_date,
        })
    }
}

const TEMPLATE_COLUMNS: &str =
    "id, start_date, type, category, amount, comment, last_generated_date";

fn template_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: r.get(0)?,
        start_date: r.get(1)?,
        kind: r.get(2)?,
        category: r.get(3)?,
        amount: r.get(4)?,
        comment: r.get(5)?,
        last_generated_date: r.get(6)?,
    })
}

/// All template rows, undecoded, in id order.
pub fn template_rows(conn: &Connection) -> Result<Vec<TemplateRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recurring_templates ORDER BY id",
        TEMPLATE_COLUMNS
    ))?;
    let rows = stmt.query_map([], template_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn list_templates(conn: &Connection) -> Result<Vec<RecurringTemplate>> {
    template_rows(conn)?
        .into_iter()
        .map(TemplateRow::parse)
        .collect()
}

pub fn get_template(conn: &Connection, id: i64) -> Result<Option<RecurringTemplate>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM recurring_templates WHERE id=?1",
                TEMPLATE_COLUMNS
            ),
            params![id],
            template_row,
        )
        .optional()?;
    row.map(TemplateRow::parse).transpose()
}

/// Moves the cursor of template `id` from `from` to `to`.
///
/// Only succeeds while the stored cursor still equals `from`, so a stale
/// caller can never move it backwards or past a period it did not write.
pub fn advance_cursor(conn: &Connection, id: i64, from: NaiveDate, to: NaiveDate) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE recurring_templates SET last_generated_date=?1
         WHERE id=?2 AND last_generated_date=?3",
        params![to.to_string(), id, from.to_string()],
    )?;
    Ok(changed > 0)
}

pub fn delete_template(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM recurring_templates WHERE id=?1", params![id])?;
    Ok(changed > 0)
}

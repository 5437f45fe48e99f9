// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{print_materialize_failures, today};
use crate::models::Transaction;
use crate::recurrence::materialize;
use crate::store::{TransactionQuery, query_transactions};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

enum Format {
    Csv,
    Json,
}

/// One exported record. Same columns the importer reads back.
#[derive(Serialize)]
struct ExportRow {
    date: String,
    #[serde(rename = "type")]
    kind: String,
    category: String,
    amount: String,
    comment: String,
}

impl From<Transaction> for ExportRow {
    fn from(t: Transaction) -> Self {
        ExportRow {
            date: t.date.to_string(),
            kind: t.kind.as_str().to_string(),
            category: t.category,
            amount: t.amount.to_string(),
            comment: t.comment,
        }
    }
}

fn export_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let format = match fmt.as_str() {
        "csv" => Format::Csv,
        "json" => Format::Json,
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    };
    let out = sub.get_one::<String>("out").unwrap().trim();

    let report = materialize(conn, today(sub)?)?;
    print_materialize_failures(&report);

    let rows: Vec<ExportRow> = query_transactions(conn, &TransactionQuery::default())?
        .into_iter()
        .map(ExportRow::from)
        .collect();

    match format {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
    }
    tracing::info!(count = rows.len(), path = out, "exported transactions");
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}

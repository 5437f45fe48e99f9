// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{TransactionDraft, TransactionType};
use crate::store::insert_transaction;
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;

    for result in rdr.records() {
        let rec = result?;
        // Physical line where the record starts; quoted fields may span several.
        let line = rec.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize, name: &str| {
            rec.get(i)
                .map(str::trim)
                .with_context(|| format!("line {}: {} missing", line, name))
        };
        let date_raw = field(0, "date")?;
        let type_raw = field(1, "type")?;
        let category = field(2, "category")?.to_string();
        let amount_raw = field(3, "amount")?;
        let comment = rec
            .get(4)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let date = parse_date(date_raw)
            .with_context(|| format!("line {}: invalid date '{}'", line, date_raw))?;
        let kind = type_raw
            .parse::<TransactionType>()
            .with_context(|| format!("line {}: invalid type '{}'", line, type_raw))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("line {}: invalid amount '{}'", line, amount_raw))?;

        let draft = TransactionDraft {
            date,
            kind,
            category,
            amount,
            comment,
        }
        .validate()
        .with_context(|| format!("line {}", line))?;
        insert_transaction(&tx, &draft)?;
        count += 1;
    }
    tx.commit()?;
    tracing::info!(count, path, "imported transactions");
    println!("Imported {} transaction(s) from {}", count, path);
    Ok(())
}

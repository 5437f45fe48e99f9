// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets::check_threshold;
use crate::commands::{
    draft_from, print_materialize_failures, print_threshold_warning, signed_money, today,
};
use crate::ledger;
use crate::models::{Transaction, TransactionType};
use crate::reports::totals;
use crate::settings::CurrencyFormat;
use crate::store::{SortOrder, TransactionQuery};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};
use anyhow::{Context, Result, anyhow};
use chrono::Months;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from(sub, "date", today(sub)?)?;
    let fmt = CurrencyFormat::load(conn)?;
    if draft.kind == TransactionType::Expense {
        if let Some(w) = check_threshold(conn, draft.category.trim(), draft.amount, draft.date)? {
            print_threshold_warning(&fmt, &w, draft.amount);
        }
    }
    let (date, kind, amount) = (draft.date, draft.kind, draft.amount);
    let id = ledger::add_transaction(conn, draft)?;
    println!(
        "Recorded {} of {} on {} (id {})",
        kind.as_str().to_lowercase(),
        fmt.format(amount),
        date,
        id
    );
    Ok(())
}

fn list(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let query = list_query(sub)?;
    let listing = ledger::list_transactions(conn, today(sub)?, &query)?;
    print_materialize_failures(&listing.materialized);
    if !listing.materialized.generated.is_empty() {
        eprintln!(
            "Generated {} recurring transaction(s)",
            listing.materialized.generated.len()
        );
    }
    if !maybe_print_json(json_flag, jsonl_flag, &listing.transactions)? {
        let fmt = CurrencyFormat::load(conn)?;
        println!("{}", transactions_table(&fmt, &listing.transactions));
        let (income, expenses) = totals(&listing.transactions);
        println!(
            "Income: {}  Expenses: {}  Balance: {}",
            fmt.format(income),
            fmt.format(expenses),
            signed_money(&fmt, income - expenses)
        );
    }
    Ok(())
}

/// Translates the `tx list` flags into a store query, newest first.
pub fn list_query(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    let mut query = TransactionQuery {
        sort: SortOrder::Descending,
        ..Default::default()
    };

    if let Some(month) = sub.get_one::<String>("month") {
        let (year, month) = parse_month(month)?;
        let start = crate::utils::first_of_month(year, month)
            .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| anyhow!("Month {}-{} is out of range", year, month))?;
        query.from = Some(start);
        query.to = Some(end);
    } else {
        query.from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
        query.to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(anyhow!("--from {} is after --to {}", from, to));
            }
        }
    }
    query.category = sub.get_one::<String>("category").map(|s| s.trim().to_string());
    query.kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?;
    query.search = sub.get_one::<String>("search").cloned();
    query.min_amount = sub
        .get_one::<String>("min")
        .map(|s| parse_decimal(s))
        .transpose()
        .context("--min")?;
    query.max_amount = sub
        .get_one::<String>("max")
        .map(|s| parse_decimal(s))
        .transpose()
        .context("--max")?;
    query.limit = sub.get_one::<usize>("limit").copied();
    Ok(query)
}

pub(crate) fn transactions_table(fmt: &CurrencyFormat, txs: &[Transaction]) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = txs
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.to_string(),
                t.category.clone(),
                signed_money(fmt, t.amount),
                t.comment.clone(),
            ]
        })
        .collect();
    pretty_table(&["ID", "Date", "Type", "Category", "Amount", "Comment"], rows)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let t = ledger::get_transaction(conn, id)?
        .ok_or_else(|| anyhow!("Transaction {} not found", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        let fmt = CurrencyFormat::load(conn)?;
        println!("{}", transactions_table(&fmt, std::slice::from_ref(&t)));
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let draft = draft_from(sub, "date", today(sub)?)?;
    if ledger::update_transaction(conn, id, draft)? {
        println!("Updated transaction {}", id);
        Ok(())
    } else {
        Err(anyhow!("Transaction {} not found", id))
    }
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    if ledger::delete_transaction(conn, id)? {
        println!("Removed transaction {}", id);
        Ok(())
    } else {
        Err(anyhow!("Transaction {} not found", id))
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets::check_threshold;
use crate::commands::transactions::transactions_table;
use crate::commands::{
    draft_from, print_materialize_failures, print_threshold_warning, signed_money, today,
};
use crate::models::{RecurringTemplate, TransactionType};
use crate::recurrence::{advance_one_month, due_dates, materialize};
use crate::settings::CurrencyFormat;
use crate::utils::{maybe_print_json, pretty_table};
use crate::{ledger, store};
use anyhow::{Result, anyhow};
use chrono::Datelike;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("sync", sub)) => sync(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from(sub, "start", today(sub)?)?;
    let fmt = CurrencyFormat::load(conn)?;
    if draft.kind == TransactionType::Expense {
        if let Some(w) = check_threshold(conn, draft.category.trim(), draft.amount, draft.date)? {
            print_threshold_warning(&fmt, &w, draft.amount);
            println!("Note: the same amount will be added every month.");
        }
    }
    let (start, amount) = (draft.date, draft.amount);
    let id = ledger::add_recurring_template(conn, draft)?;
    println!(
        "Added recurring template {}: {} every month on day {}, starting after {}",
        id,
        fmt.format(amount),
        start.day(),
        start
    );
    Ok(())
}

/// Templates that decode cleanly; broken rows are reported on stderr.
fn readable_templates(conn: &Connection) -> Result<Vec<RecurringTemplate>> {
    let mut templates = Vec::new();
    for row in store::template_rows(conn)? {
        match row.parse() {
            Ok(t) => templates.push(t),
            Err(e) => eprintln!("warning: {}", e),
        }
    }
    Ok(templates)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let templates = readable_templates(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &templates)? {
        return Ok(());
    }
    let fmt = CurrencyFormat::load(conn)?;
    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|t| {
            let next = advance_one_month(t.last_generated_date, t.anchor_day())
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            vec![
                t.id.to_string(),
                t.start_date.to_string(),
                t.anchor_day().to_string(),
                t.kind.to_string(),
                t.category.clone(),
                signed_money(&fmt, t.amount),
                t.comment.clone(),
                t.last_generated_date.to_string(),
                next,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID", "Start", "Day", "Type", "Category", "Amount", "Comment", "Last", "Next",
            ],
            rows,
        )
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    if store::delete_template(conn, id)? {
        println!("Removed recurring template {}", id);
        Ok(())
    } else {
        Err(anyhow!("Recurring template {} not found", id))
    }
}

fn sync(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = today(sub)?;
    let fmt = CurrencyFormat::load(conn)?;

    if sub.get_flag("dry-run") {
        let mut rows = Vec::new();
        for t in readable_templates(conn)? {
            for date in due_dates(&t, as_of) {
                rows.push(vec![
                    t.id.to_string(),
                    date.to_string(),
                    t.category.clone(),
                    signed_money(&fmt, t.amount),
                ]);
            }
        }
        println!("{} occurrence(s) due as of {}", rows.len(), as_of);
        println!("{}", pretty_table(&["Template", "Date", "Category", "Amount"], rows));
        return Ok(());
    }

    let report = materialize(conn, as_of)?;
    print_materialize_failures(&report);
    println!(
        "Generated {} recurring transaction(s) as of {}",
        report.generated.len(),
        as_of
    );
    if !report.generated.is_empty() {
        println!("{}", transactions_table(&fmt, &report.generated));
    }
    Ok(())
}

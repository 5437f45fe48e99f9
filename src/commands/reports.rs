// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{print_materialize_failures, signed_money, today};
use crate::recurrence::materialize;
use crate::reports::{CategoryAmount, monthly_report, yearly_report};
use crate::settings::CurrencyFormat;
use crate::utils::{maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("yearly", sub)) => yearly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Reports read the same data `tx list` shows, so due occurrences go in first.
fn sync_recurring(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = materialize(conn, today(sub)?)?;
    print_materialize_failures(&report);
    Ok(())
}

fn category_rows(fmt: &CurrencyFormat, items: &[CategoryAmount]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|c| vec![c.category.clone(), fmt.format(c.amount)])
        .collect()
}

fn monthly(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    sync_recurring(conn, sub)?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let report = monthly_report(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let fmt = CurrencyFormat::load(conn)?;
    println!("Monthly report {}-{:02}", year, month);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net", "Transactions"],
            vec![vec![
                fmt.format(report.total_income),
                fmt.format(report.total_expenses),
                signed_money(&fmt, report.net),
                report.transaction_count.to_string(),
            ]],
        )
    );
    if !report.category_breakdown.is_empty() {
        println!(
            "{}",
            pretty_table(
                &["Category", "Spent"],
                category_rows(&fmt, &report.category_breakdown)
            )
        );
    }
    if !report.budget_status.is_empty() {
        let rows = report
            .budget_status
            .iter()
            .map(|s| {
                vec![
                    s.category.clone(),
                    fmt.format(s.budget),
                    fmt.format(s.spent),
                    fmt.format(s.remaining),
                    format!("{:.1}%", s.percentage),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining", "Used"], rows)
        );
    }
    Ok(())
}

fn yearly(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    sync_recurring(conn, sub)?;
    let year = *sub.get_one::<i32>("year").unwrap();
    let report = yearly_report(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let fmt = CurrencyFormat::load(conn)?;
    println!("Yearly report {}", year);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net", "Avg income/mo", "Avg expenses/mo"],
            vec![vec![
                fmt.format(report.total_income),
                fmt.format(report.total_expenses),
                signed_money(&fmt, report.net),
                fmt.format(report.monthly_avg_income),
                fmt.format(report.monthly_avg_expenses),
            ]],
        )
    );
    let rows = report
        .monthly_breakdown
        .iter()
        .map(|m| {
            vec![
                format!("{}-{:02}", year, m.month),
                fmt.format(m.income),
                fmt.format(m.expenses),
                signed_money(&fmt, m.net),
                match m.growth_pct {
                    Some(g) if g.is_sign_negative() => format!("{:.1}%", g),
                    Some(g) => format!("+{:.1}%", g),
                    None => "-".into(),
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expenses", "Net", "Change"], rows)
    );
    if !report.category_breakdown.is_empty() {
        println!(
            "{}",
            pretty_table(
                &["Category", "Spent"],
                category_rows(&fmt, &report.category_breakdown)
            )
        );
    }
    Ok(())
}

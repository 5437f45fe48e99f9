// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets::{budget_summary, set_threshold, thresholds};
use crate::commands::today;
use crate::settings::CurrencyFormat;
use crate::utils::{maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cat = sub.get_one::<String>("category").unwrap();
    let limit = parse_decimal(sub.get_one::<String>("limit").unwrap())?;
    set_threshold(conn, cat, limit)?;
    let fmt = CurrencyFormat::load(conn)?;
    if limit.is_zero() {
        println!("Monitoring disabled for {}", cat.trim());
    } else {
        println!("Monthly limit for {} = {}", cat.trim(), fmt.format(limit));
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = thresholds(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let fmt = CurrencyFormat::load(conn)?;
        let rows = data
            .into_iter()
            .map(|t| vec![t.category, fmt.format(t.monthly_limit)])
            .collect();
        println!("{}", pretty_table(&["Category", "Monthly limit"], rows));
    }
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => {
            let d = today(sub)?;
            (d.year(), d.month())
        }
    };
    let data = budget_summary(conn, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let fmt = CurrencyFormat::load(conn)?;
        let rows = data
            .into_iter()
            .map(|s| {
                vec![
                    s.category,
                    fmt.format(s.budget),
                    fmt.format(s.spent),
                    fmt.format(s.remaining),
                    format!("{:.1}%", s.percentage),
                ]
            })
            .collect();
        println!("Budget status for {}-{:02}", year, month);
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining", "Used"], rows)
        );
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::{CurrencyFormat, SymbolPosition};
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("currency", sub)) => currency(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let fmt = CurrencyFormat::load(conn)?;
    let sample = fmt.format(Decimal::new(123456789, 2));
    println!(
        "{}",
        pretty_table(
            &["Setting", "Value"],
            vec![
                vec!["Currency symbol".into(), fmt.symbol.clone()],
                vec!["Symbol position".into(), fmt.position.to_string()],
                vec!["Example".into(), sample],
            ],
        )
    );
    Ok(())
}

fn currency(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub.get_one::<String>("symbol").unwrap();
    let position = sub
        .get_one::<String>("position")
        .unwrap()
        .parse::<SymbolPosition>()?;
    let fmt = CurrencyFormat::new(symbol, position)?;
    fmt.save(conn)?;
    println!("Amounts now display as {}", fmt.format(Decimal::new(123456, 2)));
    Ok(())
}

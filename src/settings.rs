// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SYMBOL_KEY: &str = "currency_symbol";
const POSITION_KEY: &str = "currency_position";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

impl SymbolPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolPosition::Before => "before",
            SymbolPosition::After => "after",
        }
    }
}

impl fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            other => Err(Error::validation(
                "currency position",
                format!("'{}' is not one of before, after", other),
            )),
        }
    }
}

/// How money is rendered for display. Loaded once and passed to whatever
/// prints amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub position: SymbolPosition,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            position: SymbolPosition::Before,
        }
    }
}

impl CurrencyFormat {
    pub fn new(symbol: &str, position: SymbolPosition) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(Error::validation("currency symbol", "must not be empty"));
        }
        Ok(CurrencyFormat {
            symbol: symbol.to_string(),
            position,
        })
    }

    /// Reads the stored format, falling back to the defaults for missing keys.
    pub fn load(conn: &Connection) -> Result<Self> {
        let defaults = CurrencyFormat::default();
        let symbol = get_setting(conn, SYMBOL_KEY)?.unwrap_or(defaults.symbol);
        let position = match get_setting(conn, POSITION_KEY)? {
            Some(raw) => raw.parse::<SymbolPosition>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring unknown currency position");
                defaults.position
            }),
            None => defaults.position,
        };
        Ok(CurrencyFormat { symbol, position })
    }

    /// Writes both keys in one transaction so a failure leaves the old format.
    pub fn save(&self, conn: &Connection) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        set_setting(&tx, SYMBOL_KEY, &self.symbol)?;
        set_setting(&tx, POSITION_KEY, self.position.as_str())?;
        tx.commit()?;
        Ok(())
    }

    /// Renders the magnitude of `amount` with thousands separators and two decimals.
    pub fn format(&self, amount: Decimal) -> String {
        let fixed = format!("{:.2}", amount.abs().round_dp(2));
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let number = format!("{}.{}", group_thousands(int_part), frac_part);
        match self.position {
            SymbolPosition::Before => format!("{}{}", self.symbol, number),
            SymbolPosition::After => format!("{}{}", number, self.symbol),
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

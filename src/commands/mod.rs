// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod transactions;
pub mod fixed;
pub mod budgets;
pub mod reports;
pub mod importer;
pub mod exporter;
pub mod settings;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::budgets::ThresholdWarning;
use crate::models::{TransactionDraft, TransactionType};
use crate::recurrence::MaterializeReport;
use crate::settings::CurrencyFormat;
use crate::utils::{parse_date, parse_decimal};

/// The `--today` override, or the local calendar date.
pub fn today(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match m.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Reads the shared record arguments; the date falls back to `today`.
pub(crate) fn draft_from(
    sub: &clap::ArgMatches,
    date_arg: &str,
    today: NaiveDate,
) -> Result<TransactionDraft> {
    let date = match sub.get_one::<String>(date_arg) {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let kind: TransactionType = sub.get_one::<String>("type").unwrap().parse()?;
    let category = sub.get_one::<String>("category").unwrap().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let comment = sub.get_one::<String>("comment").map(|s| s.to_string());
    Ok(TransactionDraft {
        date,
        kind,
        category,
        amount,
        comment,
    })
}

/// Signed amount as the user sees it: `-$1,200.00`, `$80.00`.
pub(crate) fn signed_money(fmt: &CurrencyFormat, amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{}", fmt.format(amount))
    } else {
        fmt.format(amount)
    }
}

pub(crate) fn print_threshold_warning(fmt: &CurrencyFormat, w: &ThresholdWarning, amount: Decimal) {
    println!(
        "Warning: this exceeds the monthly limit for {}: limit {}, spent {}, this {}, new total {}",
        w.category,
        fmt.format(w.limit),
        fmt.format(w.current_total),
        fmt.format(amount),
        fmt.format(w.new_total)
    );
}

pub(crate) fn print_materialize_failures(report: &MaterializeReport) {
    for f in &report.failures {
        eprintln!(
            "warning: recurring template {} was not brought up to date: {}",
            f.template_id, f.error
        );
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate};
use moneymanager::models::{TransactionDraft, TransactionType};
use moneymanager::recurrence::{advance_one_month, due_dates, materialize};
use moneymanager::store::{self, TransactionQuery};
use moneymanager::{Error, db, ledger};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn rent(start: &str) -> TransactionDraft {
    TransactionDraft {
        date: d(start),
        kind: TransactionType::Expense,
        category: "Rent".into(),
        amount: Decimal::new(120000, 2),
        comment: Some("flat".into()),
    }
}

fn salary(start: &str) -> TransactionDraft {
    TransactionDraft {
        date: d(start),
        kind: TransactionType::Income,
        category: "Salary".into(),
        amount: Decimal::new(3000, 0),
        comment: None,
    }
}

fn all_dates(conn: &Connection) -> Vec<String> {
    store::query_transactions(conn, &TransactionQuery::default())
        .unwrap()
        .into_iter()
        .map(|t| t.date.to_string())
        .collect()
}

fn cursor(conn: &Connection, id: i64) -> String {
    conn.query_row(
        "SELECT last_generated_date FROM recurring_templates WHERE id=?1",
        params![id],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn catch_up_generates_every_missed_month() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();

    let report = materialize(&mut conn, d("2024-04-20")).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.generated.len(), 3);
    assert_eq!(all_dates(&conn), ["2024-02-15", "2024-03-15", "2024-04-15"]);
    assert_eq!(cursor(&conn, id), "2024-04-15");

    let txs = store::query_transactions(&conn, &TransactionQuery::default()).unwrap();
    for t in &txs {
        assert_eq!(t.kind, TransactionType::Expense);
        assert_eq!(t.category, "Rent");
        assert_eq!(t.amount, Decimal::new(-120000, 2));
        assert_eq!(t.comment, "flat");
    }
}

#[test]
fn repeated_passes_are_idempotent() {
    let mut conn = setup();
    ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();

    materialize(&mut conn, d("2024-04-20")).unwrap();
    let second = materialize(&mut conn, d("2024-04-20")).unwrap();
    let third = materialize(&mut conn, d("2024-04-30")).unwrap();
    assert!(second.generated.is_empty());
    assert!(third.generated.is_empty());
    assert_eq!(all_dates(&conn).len(), 3);
}

#[test]
fn nothing_is_due_before_the_first_occurrence() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();

    // The anchor date itself is never generated.
    let report = materialize(&mut conn, d("2024-02-14")).unwrap();
    assert!(report.generated.is_empty());
    assert!(all_dates(&conn).is_empty());
    assert_eq!(cursor(&conn, id), "2024-01-15");

    let report = materialize(&mut conn, d("2024-02-15")).unwrap();
    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.generated[0].date, d("2024-02-15"));
}

#[test]
fn late_anchor_days_clamp_to_month_end_without_drifting() {
    let mut conn = setup();
    ledger::add_recurring_template(&conn, rent("2024-01-31")).unwrap();

    materialize(&mut conn, d("2024-06-30")).unwrap();
    assert_eq!(
        all_dates(&conn),
        [
            "2024-02-29",
            "2024-03-31",
            "2024-04-30",
            "2024-05-31",
            "2024-06-30"
        ]
    );
}

#[test]
fn occurrences_cross_the_year_boundary() {
    let mut conn = setup();
    ledger::add_recurring_template(&conn, salary("2023-11-25")).unwrap();

    let report = materialize(&mut conn, d("2024-02-01")).unwrap();
    let dates: Vec<_> = report.generated.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, ["2023-12-25", "2024-01-25"]);
    assert!(report.generated.iter().all(|t| t.comment == "-"));
}

#[test]
fn anchors_up_to_27_match_the_add_32_days_rule() {
    for anchor in 1..=27u32 {
        let mut cursor = d(&format!("2023-01-{:02}", anchor));
        for _ in 0..30 {
            let next = advance_one_month(cursor, anchor).unwrap();
            let by_rule = (cursor + Duration::days(32)).with_day(anchor).unwrap();
            assert_eq!(next, by_rule, "anchor {} after {}", anchor, cursor);
            cursor = next;
        }
    }
}

#[test]
fn anchor_28_never_skips_february() {
    // Adding 32 days to 2023-01-28 would land in March.
    assert_eq!(advance_one_month(d("2023-01-28"), 28), Some(d("2023-02-28")));
    assert_eq!(advance_one_month(d("2023-02-28"), 28), Some(d("2023-03-28")));
    assert_eq!(advance_one_month(d("2024-01-28"), 28), Some(d("2024-02-28")));
}

#[test]
fn clamped_cursor_returns_to_the_anchor_day() {
    assert_eq!(advance_one_month(d("2023-02-28"), 30), Some(d("2023-03-30")));
    assert_eq!(advance_one_month(d("2024-04-30"), 31), Some(d("2024-05-31")));
    assert_eq!(advance_one_month(d("2024-12-31"), 31), Some(d("2025-01-31")));
}

#[test]
fn due_dates_previews_without_writing() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();
    let template = store::get_template(&conn, id).unwrap().unwrap();

    let dates = due_dates(&template, d("2024-03-15"));
    assert_eq!(dates, [d("2024-02-15"), d("2024-03-15")]);
    assert!(all_dates(&conn).is_empty());

    let report = materialize(&mut conn, d("2024-03-15")).unwrap();
    let written: Vec<_> = report.generated.iter().map(|t| t.date).collect();
    assert_eq!(written, dates);
}

#[test]
fn failed_step_rolls_back_and_later_pass_resumes() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();
    conn.execute_batch(
        r#"
        CREATE TRIGGER fail_cursor BEFORE UPDATE OF last_generated_date ON recurring_templates
        WHEN NEW.last_generated_date > '2024-02-15'
        BEGIN
            SELECT RAISE(ABORT, 'simulated crash');
        END;
        "#,
    )
    .unwrap();

    let report = materialize(&mut conn, d("2024-04-20")).unwrap();
    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].template_id, id);
    // The 03-15 insert shared a transaction with the failed cursor move.
    assert_eq!(all_dates(&conn), ["2024-02-15"]);
    assert_eq!(cursor(&conn, id), "2024-02-15");

    conn.execute_batch("DROP TRIGGER fail_cursor;").unwrap();
    let report = materialize(&mut conn, d("2024-04-20")).unwrap();
    assert!(report.is_clean());
    assert_eq!(all_dates(&conn), ["2024-02-15", "2024-03-15", "2024-04-15"]);
    assert_eq!(cursor(&conn, id), "2024-04-15");
}

#[test]
fn failure_before_any_step_leaves_no_trace() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();
    conn.execute_batch(
        r#"
        CREATE TRIGGER fail_cursor BEFORE UPDATE OF last_generated_date ON recurring_templates
        BEGIN
            SELECT RAISE(ABORT, 'simulated crash');
        END;
        "#,
    )
    .unwrap();

    let report = materialize(&mut conn, d("2024-04-20")).unwrap();
    assert!(report.generated.is_empty());
    assert!(!report.is_clean());
    assert!(all_dates(&conn).is_empty());
    assert_eq!(cursor(&conn, id), "2024-01-15");
}

#[test]
fn broken_template_is_skipped_and_others_still_run() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO recurring_templates(start_date,type,category,amount,comment,last_generated_date)
         VALUES ('2024-02-30','Expense','Gym','-30','-','2024-02-30')",
        [],
    )
    .unwrap();
    let good = ledger::add_recurring_template(&conn, salary("2024-01-10")).unwrap();

    let report = materialize(&mut conn, d("2024-03-10")).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        Error::InvalidTemplate { id: 1, .. }
    ));
    assert_eq!(report.generated.len(), 2);
    assert!(report.generated.iter().all(|t| t.category == "Salary"));
    assert_eq!(cursor(&conn, good), "2024-03-10");
}

#[test]
fn template_with_invalid_amount_is_reported_not_written() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO recurring_templates(start_date,type,category,amount,comment,last_generated_date)
         VALUES ('2024-01-05','Expense','Gym','0','-','2024-01-05')",
        [],
    )
    .unwrap();

    let report = materialize(&mut conn, d("2024-03-10")).unwrap();
    assert!(report.generated.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(all_dates(&conn).is_empty());
    assert_eq!(cursor(&conn, 1), "2024-01-05");
}

#[test]
fn list_transactions_materializes_before_querying() {
    let mut conn = setup();
    ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();
    ledger::add_transaction(&conn, salary("2024-03-01")).unwrap();

    let listing = ledger::list_transactions(
        &mut conn,
        d("2024-03-20"),
        &TransactionQuery {
            category: Some("Rent".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(listing.materialized.generated.len(), 2);
    let dates: Vec<_> = listing.transactions.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, ["2024-02-15", "2024-03-15"]);

    let again = ledger::list_transactions(&mut conn, d("2024-03-20"), &TransactionQuery::default())
        .unwrap();
    assert!(again.materialized.generated.is_empty());
    assert_eq!(again.transactions.len(), 3);
}

#[test]
fn deleted_template_keeps_its_generated_transactions() {
    let mut conn = setup();
    let id = ledger::add_recurring_template(&conn, rent("2024-01-15")).unwrap();
    materialize(&mut conn, d("2024-03-15")).unwrap();

    assert!(store::delete_template(&conn, id).unwrap());
    assert!(!store::delete_template(&conn, id).unwrap());
    let report = materialize(&mut conn, d("2024-06-15")).unwrap();
    assert!(report.generated.is_empty());
    assert_eq!(all_dates(&conn).len(), 2);
}

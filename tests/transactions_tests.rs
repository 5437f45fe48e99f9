// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneymanager::models::TransactionType;
use moneymanager::store::{self, SortOrder, TransactionQuery};
use moneymanager::{cli, commands, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn list_matches(args: &[&str]) -> anyhow::Result<TransactionQuery> {
    let mut argv = vec!["moneymanager", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return commands::transactions::list_query(list_m);
        }
    }
    panic!("no tx list subcommand");
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneymanager", "--today", "2025-03-15"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", sub)) => commands::transactions::handle(conn, sub),
        Some(("fixed", sub)) => commands::fixed::handle(conn, sub),
        Some(("budget", sub)) => commands::budgets::handle(conn, sub),
        Some(("report", sub)) => commands::reports::handle(conn, sub),
        _ => panic!("unexpected subcommand"),
    }
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn list_flags_build_the_query() {
    let q = list_matches(&[
        "--from",
        "2025-01-01",
        "--to",
        "2025-01-31",
        "--category",
        " Food ",
        "--type",
        "expense",
        "--search",
        "shop",
        "--min",
        "10",
        "--max",
        "200",
        "--limit",
        "5",
    ])
    .unwrap();
    assert_eq!(q.from, Some(d("2025-01-01")));
    assert_eq!(q.to, Some(d("2025-01-31")));
    assert_eq!(q.category.as_deref(), Some("Food"));
    assert_eq!(q.kind, Some(TransactionType::Expense));
    assert_eq!(q.search.as_deref(), Some("shop"));
    assert_eq!(q.min_amount, Some(Decimal::from(10)));
    assert_eq!(q.max_amount, Some(Decimal::from(200)));
    assert_eq!(q.limit, Some(5));
    assert_eq!(q.sort, SortOrder::Descending);
}

#[test]
fn month_flag_covers_the_whole_month() {
    let q = list_matches(&["--month", "2024-02"]).unwrap();
    assert_eq!(q.from, Some(d("2024-02-01")));
    assert_eq!(q.to, Some(d("2024-02-29")));

    assert!(list_matches(&["--month", "2024-13"]).is_err());
    assert!(list_matches(&["--from", "2025-02-01", "--to", "2025-01-01"]).is_err());
    assert!(list_matches(&["--type", "transfer"]).is_err());
}

#[test]
fn add_edit_and_remove_through_the_cli() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "tx", "add", "--type", "expense", "--category", "Food", "--amount", "12.50",
        ],
    )
    .unwrap();
    let txs = store::query_transactions(&conn, &TransactionQuery::default()).unwrap();
    assert_eq!(txs.len(), 1);
    // No --date means --today.
    assert_eq!(txs[0].date, d("2025-03-15"));
    assert_eq!(txs[0].amount, Decimal::new(-1250, 2));
    let id = txs[0].id.to_string();

    run(
        &mut conn,
        &[
            "tx", "edit", "--id", &id, "--date", "2025-03-01", "--type", "income", "--category",
            "Refund", "--amount", "12.50", "--comment", "returned",
        ],
    )
    .unwrap();
    let t = store::get_transaction(&conn, txs[0].id).unwrap().unwrap();
    assert_eq!(t.kind, TransactionType::Income);
    assert_eq!(t.comment, "returned");

    assert!(run(&mut conn, &["tx", "rm", "--id", "999"]).is_err());
    run(&mut conn, &["tx", "rm", "--id", &id]).unwrap();
    assert!(store::get_transaction(&conn, t.id).unwrap().is_none());
}

#[test]
fn rejected_input_writes_nothing() {
    let mut conn = setup();
    assert!(run(
        &mut conn,
        &["tx", "add", "--type", "expense", "--category", "Food", "--amount", "0"],
    )
    .is_err());
    assert!(run(
        &mut conn,
        &["tx", "add", "--type", "income", "--category", "Pay", "--amount", "-5"],
    )
    .is_err());
    assert!(store::query_transactions(&conn, &TransactionQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn fixed_templates_materialize_on_list_and_sync() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "fixed", "add", "--start", "2025-01-31", "--type", "expense", "--category", "Rent",
            "--amount", "900",
        ],
    )
    .unwrap();
    let templates = store::list_templates(&conn).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].last_generated_date, d("2025-01-31"));

    // A dry run writes nothing.
    run(&mut conn, &["fixed", "sync", "--dry-run"]).unwrap();
    assert!(store::query_transactions(&conn, &TransactionQuery::default())
        .unwrap()
        .is_empty());

    run(&mut conn, &["tx", "list", "--json"]).unwrap();
    let dates: Vec<_> = store::query_transactions(&conn, &TransactionQuery::default())
        .unwrap()
        .into_iter()
        .map(|t| t.date.to_string())
        .collect();
    assert_eq!(dates, ["2025-02-28"]);

    run(&mut conn, &["fixed", "sync"]).unwrap();
    run(&mut conn, &["report", "monthly", "--month", "2025-02", "--json"]).unwrap();
    assert_eq!(
        store::query_transactions(&conn, &TransactionQuery::default())
            .unwrap()
            .len(),
        1
    );

    run(&mut conn, &["fixed", "rm", "--id", &templates[0].id.to_string()]).unwrap();
    assert!(store::list_templates(&conn).unwrap().is_empty());
    assert!(run(&mut conn, &["fixed", "rm", "--id", "42"]).is_err());
}

#[test]
fn budget_commands_store_limits() {
    let mut conn = setup();
    run(&mut conn, &["budget", "set", "--category", "Food", "--limit", "250"]).unwrap();
    run(&mut conn, &["budget", "status", "--json"]).unwrap();
    assert!(run(&mut conn, &["budget", "set", "--category", "Food", "--limit", "-1"]).is_err());
    let limit: String = conn
        .query_row(
            "SELECT monthly_limit FROM category_thresholds WHERE category='Food'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(limit, "250");
}

#[test]
fn list_totals_cover_the_filtered_rows() {
    let mut conn = setup();
    for args in [
        ["income", "Salary", "3000", "2025-03-01"],
        ["expense", "Food", "120.50", "2025-03-02"],
        ["expense", "Food", "29.50", "2025-03-03"],
        ["expense", "Rent", "900", "2025-02-01"],
    ] {
        run(
            &mut conn,
            &[
                "tx", "add", "--type", args[0], "--category", args[1], "--amount", args[2],
                "--date", args[3],
            ],
        )
        .unwrap();
    }
    run(&mut conn, &["tx", "list", "--month", "2025-03"]).unwrap();

    let q = list_matches(&["--month", "2025-03"]).unwrap();
    let rows = store::query_transactions(&conn, &q).unwrap();
    assert_eq!(
        moneymanager::reports::totals(&rows),
        (Decimal::from(3000), Decimal::from(150))
    );

    let q = list_matches(&["--category", "Food"]).unwrap();
    let rows = store::query_transactions(&conn, &q).unwrap();
    let (income, expenses) = moneymanager::reports::totals(&rows);
    assert_eq!(income, Decimal::ZERO);
    assert_eq!(income - expenses, Decimal::from(-150));
}

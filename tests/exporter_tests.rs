// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneymanager::{cli, commands::exporter, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO transactions(date,type,category,amount,comment) VALUES
            ('2025-01-05','Income','Salary','2500','-'),
            ('2025-01-02','Expense','Groceries','-12.34','Weekly run');
        "#,
    )
    .unwrap();
    conn
}

fn run_export(conn: &mut Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "moneymanager",
        "--today",
        "2025-01-31",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    match matches.subcommand() {
        Some(("export", export_m)) => exporter::handle(conn, export_m),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_transactions_writes_pretty_json_in_date_order() {
    let mut conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&mut conn, "JSON", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-02",
                "type": "Expense",
                "category": "Groceries",
                "amount": "-12.34",
                "comment": "Weekly run"
            },
            {
                "date": "2025-01-05",
                "type": "Income",
                "category": "Salary",
                "amount": "2500",
                "comment": "-"
            }
        ])
    );
}

#[test]
fn export_csv_can_be_imported_back() {
    let mut conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&mut conn, "csv", &out_str).unwrap();
    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(
        lines,
        [
            "date,type,category,amount,comment",
            "2025-01-02,Expense,Groceries,-12.34,Weekly run",
            "2025-01-05,Income,Salary,2500,-",
        ]
    );

    let mut fresh = Connection::open_in_memory().unwrap();
    db::init_schema(&fresh).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "moneymanager",
        "import",
        "transactions",
        "--path",
        &out_str,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        moneymanager::commands::importer::handle(&mut fresh, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    let count: i64 = fresh
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let mut conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&mut conn, "xml", &out_str).is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_includes_due_recurring_transactions() {
    let mut conn = base_conn();
    conn.execute(
        "INSERT INTO recurring_templates(start_date,type,category,amount,comment,last_generated_date)
         VALUES ('2024-12-20','Expense','Rent','900','-','2024-12-20')",
        [],
    )
    .unwrap();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&mut conn, "json", &out_str).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["date"], "2025-01-20");
    assert_eq!(rows[2]["amount"], "-900");
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "MoneyManager", "moneymanager"));

/// Default database location inside the platform data dir.
pub fn db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("transactions.sqlite"))
}

/// Opens (creating if needed) the database at `path` and brings the schema up.
pub fn open_at(path: &Path) -> Result<Connection> {
    let unavailable = |source| Error::StoreUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let conn = Connection::open(path).map_err(unavailable)?;
    init_schema(&conn).map_err(unavailable)?;
    tracing::debug!(path = %path.display(), "opened store");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- amount is a decimal string; expenses negative, income positive
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('Income','Expense')),
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT '-',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK((type = 'Income' AND CAST(amount AS REAL) >= 0)
           OR (type = 'Expense' AND CAST(amount AS REAL) <= 0))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type);
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);

    CREATE TABLE IF NOT EXISTS recurring_templates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_date TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('Income','Expense')),
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT '-',
        last_generated_date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK(last_generated_date >= start_date)
    );

    -- monthly_limit of 0 disables the warning for that category
    CREATE TABLE IF NOT EXISTS category_thresholds(
        category TEXT PRIMARY KEY,
        monthly_limit TEXT NOT NULL
    );
    "#,
    )
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Haulbook", "haulbook"));

pub const DB_ENV: &str = "HAULBOOK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        let p = PathBuf::from(p);
        if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database dir")?;
        }
        return Ok(p);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("haulbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS drivers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category TEXT NOT NULL CHECK(category IN ('employee','third-party')),
        commission_percent TEXT, -- NULL means category default
        status TEXT DEFAULT 'active',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS trucks(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plate TEXT NOT NULL UNIQUE,
        model TEXT
    );

    CREATE TABLE IF NOT EXISTS freights(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        driver_id INTEGER NOT NULL,
        origin TEXT,
        destination TEXT,
        value TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(driver_id) REFERENCES drivers(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_freights_driver_date ON freights(driver_id, date);

    CREATE TABLE IF NOT EXISTS advances(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        driver_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        period TEXT NOT NULL, -- MM/YYYY
        FOREIGN KEY(driver_id) REFERENCES drivers(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_advances_driver_date ON advances(driver_id, date);

    CREATE TABLE IF NOT EXISTS fuel_logs(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        truck_id INTEGER NOT NULL,
        fuel_type TEXT NOT NULL,
        liters TEXT NOT NULL,
        total_value TEXT NOT NULL,
        FOREIGN KEY(truck_id) REFERENCES trucks(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_fuel_logs_date ON fuel_logs(date);

    CREATE TABLE IF NOT EXISTS settlements(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        driver_id INTEGER NOT NULL,
        period TEXT NOT NULL,
        total_freights INTEGER NOT NULL,
        gross_value TEXT NOT NULL,
        commission_value TEXT NOT NULL,
        deductions TEXT NOT NULL,
        bonus TEXT NOT NULL DEFAULT '0',
        net_value TEXT NOT NULL,
        status TEXT NOT NULL CHECK(status IN ('pending','paid','late')),
        operator TEXT,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(driver_id, period),
        FOREIGN KEY(driver_id) REFERENCES drivers(id) ON DELETE CASCADE
    );
    "#,
    )
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::period::Period;

/// Accepts `1234.56` and the comma-decimal `1234,56`.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let s = s.trim();
    s.replace(',', ".")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Largest money or quantity value accepted on entry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Money or quantity that must not be negative or above [`MAX_AMOUNT`].
pub fn parse_amount(s: &str, what: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d < Decimal::ZERO {
        return Err(anyhow!("{} cannot be negative: {}", what, d));
    }
    if d > MAX_AMOUNT {
        return Err(anyhow!("{} exceeds the maximum of {}: {}", what, MAX_AMOUNT, d));
    }
    Ok(d)
}

pub fn parse_id(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", s.trim()))
}

pub fn parse_period(s: &str) -> Result<Period> {
    Ok(s.parse::<Period>()?)
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    format!("{} {:.2}", symbol, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_driver(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM drivers WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .with_context(|| format!("Driver '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn id_for_truck(conn: &Connection, plate: &str) -> Result<i64> {
    let plate = normalize_plate(plate);
    let mut stmt = conn.prepare("SELECT id FROM trucks WHERE plate=?1")?;
    let id: i64 = stmt
        .query_row(params![plate], |r| r.get(0))
        .with_context(|| format!("Truck '{}' not found", plate))?;
    Ok(id)
}

pub fn normalize_plate(plate: &str) -> String {
    plate.trim().replace([' ', '-'], "").to_uppercase()
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

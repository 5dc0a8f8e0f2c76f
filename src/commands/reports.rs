// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::commands::fuel::range_args;
use crate::config::AppConfig;
use crate::reports::{fuel_by_type, freight_by_driver};
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    match m.subcommand() {
        Some(("freight", sub)) => freight(conn, sub, cfg)?,
        Some(("fuel", sub)) => fuel(conn, sub, cfg)?,
        _ => {}
    }
    Ok(())
}

fn freight(conn: &Connection, sub: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    let (from, to) = range_args(sub)?;
    let store = SqliteStore::new(conn);
    let names: HashMap<i64, String> = store
        .all_drivers()?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();
    let data = freight_by_driver(&store.freight_in_range(from, to)?, &names)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let sym = cfg.currency_symbol.as_str();
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.driver_name.clone(),
                t.freights.to_string(),
                fmt_money(&t.total_value, sym),
                fmt_money(&t.average_value, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Driver", "Freights", "Total", "Average"], rows)
    );
    Ok(())
}

fn fuel(conn: &Connection, sub: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    let (from, to) = range_args(sub)?;
    let data = fuel_by_type(&SqliteStore::new(conn).fuel_in_range(from, to)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let sym = cfg.currency_symbol.as_str();
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.fuel_type.clone(),
                t.fills.to_string(),
                format!("{:.2}", t.liters),
                fmt_money(&t.total_value, sym),
                fmt_money(&t.average_price_per_liter, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Fuel", "Fills", "Liters", "Total", "Avg / L"], rows)
    );
    Ok(())
}

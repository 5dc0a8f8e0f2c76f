// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::period::{current_date, format_display_date, parse_date};
use crate::store::SqliteStore;
use crate::utils::{id_for_truck, maybe_print_json, parse_amount, pretty_table};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let truck = sub.get_one::<String>("truck").unwrap();
    let fuel_type = sub.get_one::<String>("type").unwrap().trim().to_uppercase();
    if fuel_type.is_empty() {
        return Err(anyhow!("Fuel type cannot be empty"));
    }
    let liters = parse_amount(sub.get_one::<String>("liters").unwrap(), "Liters")?;
    let total = parse_amount(sub.get_one::<String>("total").unwrap(), "Fuel total")?;
    let truck_id = id_for_truck(conn, truck)?;
    conn.execute(
        "INSERT INTO fuel_logs(date, truck_id, fuel_type, liters, total_value) VALUES (?1,?2,?3,?4,?5)",
        params![date.to_string(), truck_id, fuel_type, liters.to_string(), total.to_string()],
    )?;
    println!(
        "Recorded {} L of {} for {} on {}",
        liters,
        fuel_type,
        truck.trim(),
        format_display_date(date)
    );
    Ok(())
}

/// `--from`/`--to` bounds; an open start takes everything up to `--to` (default today).
pub fn range_args(sub: &clap::ArgMatches) -> Result<(NaiveDate, NaiveDate)> {
    let from = match sub.get_one::<String>("from") {
        Some(s) => parse_date(s)?,
        None => NaiveDate::MIN,
    };
    let to = match sub.get_one::<String>("to") {
        Some(s) => parse_date(s)?,
        None => current_date(),
    };
    if from > to {
        return Err(anyhow!(
            "--from {} is after --to {}",
            format_display_date(from),
            format_display_date(to)
        ));
    }
    Ok((from, to))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range_args(sub)?;
    let data = SqliteStore::new(conn).fuel_in_range(from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|f| {
                vec![
                    f.date.to_string(),
                    f.truck_plate.clone(),
                    f.fuel_type.clone(),
                    f.liters.to_string(),
                    f.total_value.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Truck", "Fuel", "Liters", "Total"], rows)
        );
    }
    Ok(())
}

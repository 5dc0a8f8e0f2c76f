// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::period::{format_display_date, parse_date, period_of};
use crate::utils::{id_for_driver, maybe_print_json, parse_amount, parse_period, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let driver = sub.get_one::<String>("driver").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let value = parse_amount(sub.get_one::<String>("value").unwrap(), "Advance value")?;
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let driver_id = id_for_driver(conn, driver)?;
    let period = period_of(date);

    conn.execute(
        "INSERT INTO advances(driver_id, date, value, description, period) VALUES (?1,?2,?3,?4,?5)",
        params![driver_id, date.to_string(), value.to_string(), description, period],
    )?;
    println!(
        "Recorded advance of {} to {} on {} (period {})",
        value,
        driver.trim(),
        format_display_date(date),
        period
    );
    Ok(())
}

#[derive(Serialize)]
pub struct AdvanceRow {
    pub date: String,
    pub driver: String,
    pub value: String,
    pub description: String,
    pub period: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<AdvanceRow>> {
    let mut sql = String::from(
        "SELECT a.date, d.name, a.value, COALESCE(a.description,''), a.period
         FROM advances a JOIN drivers d ON a.driver_id=d.id WHERE 1=1",
    );
    let mut args: Vec<String> = Vec::new();
    if let Some(driver) = sub.get_one::<String>("driver") {
        args.push(driver.trim().to_string());
        sql.push_str(&format!(" AND d.name=?{}", args.len()));
    }
    if let Some(p) = sub.get_one::<String>("period") {
        let period = parse_period(p)?;
        if !period.is_calendar_month() {
            return Err(anyhow!("Advance periods are calendar months (MM/YYYY)"));
        }
        args.push(period.to_string());
        sql.push_str(&format!(" AND a.period=?{}", args.len()));
    }
    sql.push_str(" ORDER BY a.date, a.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |r| {
        Ok(AdvanceRow {
            date: r.get(0)?,
            driver: r.get(1)?,
            value: r.get(2)?,
            description: r.get(3)?,
            period: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.driver.clone(),
                    r.value.clone(),
                    r.description.clone(),
                    r.period.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Driver", "Value", "Description", "Period"], rows)
        );
    }
    Ok(())
}

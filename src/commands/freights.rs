// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::FreightStatus;
use crate::period::{format_display_date, parse_date};
use crate::utils::{id_for_driver, maybe_print_json, parse_amount, parse_id, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => set_status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn trimmed(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let driver = sub.get_one::<String>("driver").unwrap();
    let value = parse_amount(sub.get_one::<String>("value").unwrap(), "Freight value")?;
    let status: FreightStatus = sub.get_one::<String>("status").unwrap().parse()?;
    let driver_id = id_for_driver(conn, driver)?;

    conn.execute(
        "INSERT INTO freights(date, driver_id, origin, destination, value, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            date.to_string(),
            driver_id,
            trimmed(sub, "origin"),
            trimmed(sub, "destination"),
            value.to_string(),
            status.as_str()
        ],
    )?;
    println!(
        "Recorded freight of {} on {} for {}",
        value,
        format_display_date(date),
        driver.trim()
    );
    Ok(())
}

#[derive(Serialize)]
pub struct FreightRow {
    pub id: i64,
    pub date: String,
    pub driver: String,
    pub origin: String,
    pub destination: String,
    pub value: String,
    pub status: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<FreightRow>> {
    let mut sql = String::from(
        "SELECT f.id, f.date, d.name, COALESCE(f.origin,''), COALESCE(f.destination,''), f.value, f.status
         FROM freights f JOIN drivers d ON f.driver_id=d.id WHERE 1=1",
    );
    let mut args: Vec<String> = Vec::new();
    if let Some(driver) = sub.get_one::<String>("driver") {
        args.push(driver.trim().to_string());
        sql.push_str(&format!(" AND d.name=?{}", args.len()));
    }
    if let Some(from) = sub.get_one::<String>("from") {
        args.push(parse_date(from)?.to_string());
        sql.push_str(&format!(" AND f.date>=?{}", args.len()));
    }
    if let Some(to) = sub.get_one::<String>("to") {
        args.push(parse_date(to)?.to_string());
        sql.push_str(&format!(" AND f.date<=?{}", args.len()));
    }
    sql.push_str(" ORDER BY f.date, f.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |r| {
        Ok(FreightRow {
            id: r.get(0)?,
            date: r.get(1)?,
            driver: r.get(2)?,
            origin: r.get(3)?,
            destination: r.get(4)?,
            value: r.get(5)?,
            status: r.get(6)?,
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
                    r.id.to_string(),
                    r.date.clone(),
                    r.driver.clone(),
                    r.origin.clone(),
                    r.destination.clone(),
                    r.value.clone(),
                    r.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Driver", "Origin", "Destination", "Value", "Status"],
                rows
            )
        );
    }
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let status: FreightStatus = sub.get_one::<String>("set").unwrap().parse()?;
    let n = conn.execute(
        "UPDATE freights SET status=?1 WHERE id=?2",
        params![status.as_str(), id],
    )?;
    if n == 0 {
        return Err(anyhow!("Freight {} not found", id));
    }
    println!("Freight {} marked {}", id, status);
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DriverCategory;
use crate::store::SqliteStore;
use crate::utils::{id_for_driver, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => set_status(conn, sub)?,
        Some(("commission", sub)) => set_commission(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_percent(raw: &str) -> Result<Decimal> {
    let p = parse_decimal(raw)?;
    if p < Decimal::ZERO || p > Decimal::ONE_HUNDRED {
        return Err(anyhow!("Commission percent must be between 0 and 100, got {}", p));
    }
    Ok(p)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("Driver name cannot be empty"));
    }
    let category: DriverCategory = sub.get_one::<String>("category").unwrap().parse()?;
    let percent = sub
        .get_one::<String>("commission")
        .map(|s| parse_percent(s))
        .transpose()?;
    conn.execute(
        "INSERT INTO drivers(name, category, commission_percent, status) VALUES (?1, ?2, ?3, 'active')",
        params![name, category.as_str(), percent.map(|p| p.to_string())],
    )?;
    println!("Added driver '{}' ({})", name, category);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let drivers = SqliteStore::new(conn).all_drivers()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &drivers)? {
        return Ok(());
    }
    let rows = drivers
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.name.clone(),
                d.category.to_string(),
                d.custom_commission_percent
                    .map(|p| format!("{}%", p.normalize()))
                    .unwrap_or_else(|| "default".into()),
                if d.active { "active" } else { "inactive" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Name", "Category", "Commission", "Status"], rows)
    );
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let status = sub.get_one::<String>("set").unwrap().trim().to_lowercase();
    if status != "active" && status != "inactive" {
        return Err(anyhow!("Unknown driver status '{}' (use active|inactive)", status));
    }
    let id = id_for_driver(conn, name)?;
    conn.execute(
        "UPDATE drivers SET status=?1 WHERE id=?2",
        params![status, id],
    )?;
    println!("Driver '{}' is now {}", name.trim(), status);
    Ok(())
}

fn set_commission(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let id = id_for_driver(conn, name)?;
    let percent = if sub.get_flag("clear") {
        None
    } else {
        sub.get_one::<String>("percent")
            .map(|s| parse_percent(s))
            .transpose()?
    };
    conn.execute(
        "UPDATE drivers SET commission_percent=?1 WHERE id=?2",
        params![percent.map(|p| p.to_string()), id],
    )?;
    match percent {
        Some(p) => println!("Commission for '{}' set to {}%", name.trim(), p),
        None => println!("Commission for '{}' reset to category default", name.trim()),
    }
    Ok(())
}

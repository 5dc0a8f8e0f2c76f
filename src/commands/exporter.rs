// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::HaulError;
use crate::models::{AdvanceRecord, FreightRecord};
use crate::store::{SettlementStore, SqliteStore};
use crate::utils::parse_id;
use crate::validator::validate;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("settlement", sub)) => export_settlement(conn, sub),
        _ => Ok(()),
    }
}

fn export_settlement(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }
    let out = sub.get_one::<String>("out").unwrap();
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;

    let store = SqliteStore::new(conn);
    let settlement = store
        .fetch_settlement(id)?
        .ok_or_else(|| HaulError::not_found("settlement", id))?;
    let driver = store
        .fetch_driver(settlement.driver_id)?
        .ok_or_else(|| HaulError::not_found("driver", settlement.driver_id))?;
    let (start, end) = settlement.period.bounds()?;
    let freights = store.fetch_freight_records(driver.id, start, end)?;
    let advances = store.fetch_advance_records(driver.id, start, end)?;
    let validation = validate(&settlement, &driver);

    if fmt == "json" {
        let doc = json!({
            "settlement": settlement,
            "driver": driver,
            "freights": freights,
            "advances": advances,
            "validation": validation,
        });
        std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
    } else {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["record", "date", "origin", "destination", "value", "note"])?;
        for f in &freights {
            write_freight(&mut wtr, f)?;
        }
        for a in &advances {
            write_advance(&mut wtr, a)?;
        }
        for (field, value) in [
            ("gross_value", settlement.gross_value),
            ("commission_value", settlement.commission_value),
            ("deductions", settlement.deductions),
            ("bonus", settlement.bonus),
            ("net_value", settlement.net_value),
        ] {
            wtr.write_record([
                "summary",
                "",
                field,
                "",
                &format!("{:.2}", value),
                &format!("{} {}", settlement.driver_name, settlement.period),
            ])?;
        }
        for e in &validation.errors {
            wtr.write_record(["error", "", "", "", "", e.as_str()])?;
        }
        for w in &validation.warnings {
            wtr.write_record(["warning", "", "", "", "", w.as_str()])?;
        }
        wtr.flush()?;
    }
    tracing::info!(settlement_id = id, format = %fmt, out = %out, "settlement exported");
    println!("Exported settlement {} to {}", id, out);
    Ok(())
}

fn write_freight<W: std::io::Write>(wtr: &mut csv::Writer<W>, f: &FreightRecord) -> Result<()> {
    wtr.write_record([
        "freight",
        &f.date.to_string(),
        f.origin.as_deref().unwrap_or(""),
        f.destination.as_deref().unwrap_or(""),
        &format!("{:.2}", f.value),
        f.status.as_str(),
    ])?;
    Ok(())
}

fn write_advance<W: std::io::Write>(wtr: &mut csv::Writer<W>, a: &AdvanceRecord) -> Result<()> {
    wtr.write_record([
        "advance",
        &a.date.to_string(),
        "",
        "",
        &format!("{:.2}", a.value),
        a.description.as_deref().unwrap_or(""),
    ])?;
    Ok(())
}

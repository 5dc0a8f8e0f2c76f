// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::error::HaulError;
use crate::store::{SettlementStore, SqliteStore};
use crate::utils::{maybe_print_json, pretty_table};
use crate::validator::{BatchValidation, validate_batch};
use anyhow::Result;
use rusqlite::Connection;

/// Validates every stored settlement against its driver's current terms.
pub fn check(conn: &Connection) -> Result<BatchValidation> {
    let store = SqliteStore::new(conn);
    let settlements = store.fetch_all_settlements()?;
    let drivers: HashMap<i64, _> = store
        .all_drivers()?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let mut pairs = Vec::with_capacity(settlements.len());
    for s in &settlements {
        let d = drivers
            .get(&s.driver_id)
            .ok_or_else(|| HaulError::not_found("driver", s.driver_id))?;
        pairs.push((s, d));
    }
    Ok(validate_batch(pairs))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let report = check(conn)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!(
        "{} settlement(s): {} valid, {} invalid",
        report.total, report.valid_count, report.invalid_count
    );
    let mut rows = Vec::new();
    for p in &report.problems {
        for e in &p.errors {
            rows.push(vec![p.driver_name.clone(), p.period.clone(), "error".into(), e.clone()]);
        }
        for w in &p.warnings {
            rows.push(vec![
                p.driver_name.clone(),
                p.period.clone(),
                "warning".into(),
                w.clone(),
            ]);
        }
    }
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Driver", "Period", "Level", "Detail"], rows));
    }
    Ok(())
}

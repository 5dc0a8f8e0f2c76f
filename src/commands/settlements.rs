// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::AppConfig;
use crate::error::HaulError;
use crate::models::{Settlement, SettlementStatus};
use crate::period::{Period, SettlementFilter, parse_date};
use crate::session::Session;
use crate::settlement::{
    apply_bonus, close_month, compute_settlement, parse_bonus, recompute, settlements_for,
};
use crate::store::{SettlementStore, SqliteStore};
use crate::utils::{fmt_money, id_for_driver, maybe_print_json, parse_id, parse_period, pretty_table};
use crate::validator::{ValidationResult, validate};
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(
    conn: &Connection,
    m: &clap::ArgMatches,
    session: &Session,
    cfg: &AppConfig,
) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("calc", sub)) => calc(&store, sub, cfg)?,
        Some(("run", sub)) => run(&store, sub, session, cfg)?,
        Some(("list", sub)) => list(&store, sub, cfg)?,
        Some(("show", sub)) => show(&store, sub, cfg)?,
        Some(("recompute", sub)) => refresh(&store, sub, session, cfg)?,
        Some(("bonus", sub)) => bonus(&store, sub, session, cfg)?,
        Some(("status", sub)) => set_status(&store, sub, session)?,
        Some(("rm", sub)) => remove(&store, sub, session)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct CheckedSettlement {
    #[serde(flatten)]
    pub settlement: Settlement,
    pub validation: ValidationResult,
}

/// Pairs each settlement with its validation against the current driver record.
pub fn checked(store: &SqliteStore<'_>, settlements: Vec<Settlement>) -> Result<Vec<CheckedSettlement>> {
    let mut out = Vec::with_capacity(settlements.len());
    for s in settlements {
        let driver = store
            .fetch_driver(s.driver_id)?
            .ok_or_else(|| HaulError::not_found("driver", s.driver_id))?;
        let validation = validate(&s, &driver);
        out.push(CheckedSettlement {
            settlement: s,
            validation,
        });
    }
    Ok(out)
}

fn print_settlements(
    sub: &clap::ArgMatches,
    items: &[CheckedSettlement],
    cfg: &AppConfig,
) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let sym = cfg.currency_symbol.as_str();
    let rows = items
        .iter()
        .map(|c| {
            let s = &c.settlement;
            vec![
                s.id.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
                s.driver_name.clone(),
                s.period.to_string(),
                s.total_freights.to_string(),
                fmt_money(&s.gross_value, sym),
                fmt_money(&s.commission_value, sym),
                fmt_money(&s.deductions, sym),
                fmt_money(&s.bonus, sym),
                fmt_money(&s.net_value, sym),
                s.status.to_string(),
                if c.validation.valid { "ok" } else { "INVALID" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID", "Driver", "Period", "Freights", "Gross", "Commission", "Advances", "Bonus",
                "Net", "Status", "Check",
            ],
            rows
        )
    );
    for c in items {
        for e in &c.validation.errors {
            println!("error   [{}] {}", c.settlement.driver_name, e);
        }
        for w in &c.validation.warnings {
            println!("warning [{}] {}", c.settlement.driver_name, w);
        }
    }
    Ok(())
}

fn calc(store: &SqliteStore<'_>, sub: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    let driver_id = id_for_driver(store.conn(), sub.get_one::<String>("driver").unwrap())?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let s = compute_settlement(store, driver_id, period)?;
    if s.total_freights == 0 {
        eprintln!("No freight for {} in {}", s.driver_name, period);
    }
    print_settlements(sub, &checked(store, vec![s])?, cfg)
}

fn run(
    store: &SqliteStore<'_>,
    sub: &clap::ArgMatches,
    session: &Session,
    cfg: &AppConfig,
) -> Result<()> {
    let operator = session.ensure_active(Local::now().naive_local())?;
    let (month, year) = match parse_period(sub.get_one::<String>("month").unwrap())? {
        Period::Month { month, year } => (month, year),
        Period::Range { .. } => return Err(anyhow!("--month expects MM/YYYY")),
    };
    let outcome = close_month(store, month, year, operator)?;
    println!(
        "Saved {} settlement(s) for {:02}/{}; {} driver(s) without freight",
        outcome.settlements.len(),
        month,
        year,
        outcome.skipped_without_freight.len()
    );
    for f in &outcome.failures {
        println!("skipped {}: {}", f.driver_name, f.error);
    }
    let items = checked(store, outcome.settlements)?;
    let rows = items
        .iter()
        .map(|c| {
            vec![
                c.settlement.id.map(|i| i.to_string()).unwrap_or_default(),
                c.settlement.driver_name.clone(),
                fmt_money(&c.settlement.net_value, &cfg.currency_symbol),
                if c.validation.valid { "ok" } else { "INVALID" }.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["ID", "Driver", "Net", "Check"], rows));
    Ok(())
}

/// Exactly one of `--month`, `--from [--to]` or `--driver`.
pub fn filter_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<SettlementFilter> {
    if let Some(m) = sub.get_one::<String>("month") {
        return match parse_period(m)? {
            Period::Month { month, year } => Ok(SettlementFilter::ByMonth { month, year }),
            Period::Range { .. } => Err(anyhow!("--month expects MM/YYYY")),
        };
    }
    if let Some(from) = sub.get_one::<String>("from") {
        let start = parse_date(from)?;
        let end = match sub.get_one::<String>("to") {
            Some(to) => parse_date(to)?,
            None => crate::period::current_date(),
        };
        return Ok(SettlementFilter::ByDateRange { start, end });
    }
    if let Some(driver) = sub.get_one::<String>("driver") {
        return Ok(SettlementFilter::ByDriver {
            driver_id: id_for_driver(conn, driver)?,
        });
    }
    Err(anyhow!("Choose --month, --from/--to or --driver"))
}

fn list(store: &SqliteStore<'_>, sub: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    let filter = filter_args(store.conn(), sub)?;
    let settlements = settlements_for(store, filter)?;
    print_settlements(sub, &checked(store, settlements)?, cfg)
}

fn load(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<Settlement> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    Ok(store
        .fetch_settlement(id)?
        .ok_or_else(|| HaulError::not_found("settlement", id))?)
}

fn show(store: &SqliteStore<'_>, sub: &clap::ArgMatches, cfg: &AppConfig) -> Result<()> {
    let s = load(store, sub)?;
    print_settlements(sub, &checked(store, vec![s])?, cfg)
}

fn refresh(
    store: &SqliteStore<'_>,
    sub: &clap::ArgMatches,
    session: &Session,
    cfg: &AppConfig,
) -> Result<()> {
    let operator = session.ensure_active(Local::now().naive_local())?;
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let before = store
        .fetch_settlement(id)?
        .ok_or_else(|| HaulError::not_found("settlement", id))?;
    let fresh = recompute(store, id)?;
    let saved = store.persist_settlement(&Settlement {
        operator: Some(operator.to_string()),
        ..fresh
    })?;
    let sym = cfg.currency_symbol.as_str();
    println!(
        "Recomputed settlement {} ({} {}): net {} -> {} (bonus {} kept)",
        id,
        saved.driver_name,
        saved.period,
        fmt_money(&before.net_value, sym),
        fmt_money(&saved.net_value, sym),
        fmt_money(&saved.bonus, sym)
    );
    Ok(())
}

fn bonus(
    store: &SqliteStore<'_>,
    sub: &clap::ArgMatches,
    session: &Session,
    cfg: &AppConfig,
) -> Result<()> {
    let operator = session.ensure_active(Local::now().naive_local())?;
    let amount = parse_bonus(sub.get_one::<String>("amount").unwrap())?;
    let current = load(store, sub)?;
    let updated = apply_bonus(&current, amount)?;
    let saved = store.persist_settlement(&Settlement {
        operator: Some(operator.to_string()),
        ..updated
    })?;
    println!(
        "Bonus for {} ({}) set to {}; net is now {}",
        saved.driver_name,
        saved.period,
        fmt_money(&saved.bonus, &cfg.currency_symbol),
        fmt_money(&saved.net_value, &cfg.currency_symbol)
    );
    Ok(())
}

fn set_status(store: &SqliteStore<'_>, sub: &clap::ArgMatches, session: &Session) -> Result<()> {
    let operator = session.ensure_active(Local::now().naive_local())?;
    let status: SettlementStatus = sub.get_one::<String>("set").unwrap().parse()?;
    if status == SettlementStatus::Calculated {
        return Err(anyhow!("'calculated' is reserved for unsaved results"));
    }
    let current = load(store, sub)?;
    let saved = store.persist_settlement(&Settlement {
        status,
        operator: Some(operator.to_string()),
        ..current
    })?;
    println!(
        "Settlement {} ({} {}) marked {}",
        saved.id.unwrap_or_default(),
        saved.driver_name,
        saved.period,
        saved.status
    );
    Ok(())
}

fn remove(store: &SqliteStore<'_>, sub: &clap::ArgMatches, session: &Session) -> Result<()> {
    session.ensure_active(Local::now().naive_local())?;
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    store
        .delete_settlement(id)
        .with_context(|| format!("Remove settlement {}", id))?;
    println!("Removed settlement {}", id);
    Ok(())
}

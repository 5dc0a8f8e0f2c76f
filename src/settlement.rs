// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Driver settlement ("fechamento") computation.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{HaulError, Result};
use crate::models::{Driver, DriverCategory, Settlement, SettlementStatus};
use crate::period::{Period, SettlementFilter};
use crate::store::SettlementStore;

/// Share of gross revenue owed to a driver, as a fraction.
///
/// A custom percentage of exactly zero counts as unset and falls back to the
/// category default.
pub fn effective_rate(driver: &Driver) -> Decimal {
    match driver.custom_commission_percent {
        Some(p) if p > Decimal::ZERO => p / Decimal::ONE_HUNDRED,
        _ => default_rate(driver.category),
    }
}

pub fn default_rate(category: DriverCategory) -> Decimal {
    match category {
        DriverCategory::ThirdParty => Decimal::new(90, 2),
        DriverCategory::Employee => Decimal::new(10, 2),
    }
}

/// `commission - deductions + bonus`, or `None` when it leaves the `Decimal` range.
pub fn net_value(commission: Decimal, deductions: Decimal, bonus: Decimal) -> Option<Decimal> {
    commission.checked_sub(deductions)?.checked_add(bonus)
}

fn checked_total<I: IntoIterator<Item = Decimal>>(values: I, what: &str) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| HaulError::invalid(format!("{} is too large to total", what)))
}

fn checked_net(commission: Decimal, deductions: Decimal, bonus: Decimal) -> Result<Decimal> {
    net_value(commission, deductions, bonus)
        .ok_or_else(|| HaulError::invalid("Net value is out of range"))
}

/// Figures for one driver over one period, read-only against the store.
///
/// Calendar-month periods come back `Pending`; ad-hoc ranges come back
/// `Calculated`. A result with `total_freights == 0` is still returned; batch
/// callers drop it.
pub fn compute_settlement<S: SettlementStore + ?Sized>(
    store: &S,
    driver_id: i64,
    period: Period,
) -> Result<Settlement> {
    let driver = store
        .fetch_driver(driver_id)?
        .ok_or_else(|| HaulError::not_found("driver", driver_id))?;
    compute_for_driver(store, &driver, period)
}

fn compute_for_driver<S: SettlementStore + ?Sized>(
    store: &S,
    driver: &Driver,
    period: Period,
) -> Result<Settlement> {
    let (start, end) = period.bounds()?;
    let freights = store.fetch_freight_records(driver.id, start, end)?;
    let advances = store.fetch_advance_records(driver.id, start, end)?;

    let gross_value = checked_total(freights.iter().map(|f| f.value), "Freight value")?;
    let deductions = checked_total(advances.iter().map(|a| a.value), "Advance value")?;
    let commission_value = gross_value
        .checked_mul(effective_rate(driver))
        .ok_or_else(|| HaulError::invalid("Commission value is out of range"))?;
    let bonus = Decimal::ZERO;
    let total_freights = u32::try_from(freights.len()).map_err(|_| {
        HaulError::Corrupt(format!(
            "{} freight records for driver {}",
            freights.len(),
            driver.id
        ))
    })?;

    Ok(Settlement {
        id: None,
        driver_id: driver.id,
        driver_name: driver.name.clone(),
        period,
        total_freights,
        gross_value,
        commission_value,
        deductions,
        bonus,
        net_value: checked_net(commission_value, deductions, bonus)?,
        status: if period.is_calendar_month() {
            SettlementStatus::Pending
        } else {
            SettlementStatus::Calculated
        },
        operator: None,
    })
}

/// Refreshes a stored settlement from current freight and advance data.
///
/// Gross, commission and deductions are recomputed; id, bonus, status and
/// operator carry over from the stored record. Nothing is written.
pub fn recompute<S: SettlementStore + ?Sized>(store: &S, settlement_id: i64) -> Result<Settlement> {
    let existing = store
        .fetch_settlement(settlement_id)?
        .ok_or_else(|| HaulError::not_found("settlement", settlement_id))?;
    let fresh = compute_settlement(store, existing.driver_id, existing.period)?;
    merge_preserving_bonus(&existing, fresh)
}

fn merge_preserving_bonus(existing: &Settlement, fresh: Settlement) -> Result<Settlement> {
    Ok(Settlement {
        id: existing.id,
        bonus: existing.bonus,
        net_value: checked_net(fresh.commission_value, fresh.deductions, existing.bonus)?,
        status: existing.status,
        operator: existing.operator.clone(),
        ..fresh
    })
}

/// Replaces the bonus using the settlement's stored commission and deductions.
pub fn apply_bonus(settlement: &Settlement, new_bonus: Decimal) -> Result<Settlement> {
    if new_bonus < Decimal::ZERO {
        return Err(HaulError::invalid(format!(
            "Bonus must be zero or positive, got {}",
            new_bonus
        )));
    }
    Ok(Settlement {
        bonus: new_bonus,
        net_value: checked_net(settlement.commission_value, settlement.deductions, new_bonus)?,
        ..settlement.clone()
    })
}

/// Parses a bonus typed by an operator.
pub fn parse_bonus(raw: &str) -> Result<Decimal> {
    let v = raw
        .trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(|_| HaulError::invalid(format!("Bonus '{}' is not a number", raw.trim())))?;
    if v < Decimal::ZERO {
        return Err(HaulError::invalid(format!(
            "Bonus must be zero or positive, got {}",
            v
        )));
    }
    Ok(v)
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverFailure {
    pub driver_id: i64,
    pub driver_name: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub settlements: Vec<Settlement>,
    pub skipped_without_freight: Vec<i64>,
    pub failures: Vec<DriverFailure>,
}

/// Computes the period for every active driver.
///
/// Drivers with no freight in the period are left out. A store failure for
/// one driver is logged and recorded; the others still compute. Only a
/// failure to list the drivers aborts the batch.
pub fn compute_batch<S: SettlementStore + ?Sized>(store: &S, period: Period) -> Result<BatchOutcome> {
    let drivers = store.fetch_active_drivers()?;
    let mut out = BatchOutcome::default();
    for driver in &drivers {
        match compute_for_driver(store, driver, period) {
            Ok(s) if s.total_freights == 0 => {
                tracing::debug!(driver_id = driver.id, %period, "no freight in period, skipping");
                out.skipped_without_freight.push(driver.id);
            }
            Ok(s) => out.settlements.push(s),
            Err(err) => {
                tracing::warn!(driver_id = driver.id, driver = %driver.name, %period, error = %err, "settlement failed, skipping driver");
                out.failures.push(DriverFailure {
                    driver_id: driver.id,
                    driver_name: driver.name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(out)
}

/// Computes a calendar month and stores the result.
///
/// Drivers that already have a settlement for the month keep its id, bonus
/// and status; their other figures are refreshed. A driver whose settlement
/// cannot be merged or saved is logged and recorded in `failures`; the rest
/// are still saved.
pub fn close_month<S: SettlementStore + ?Sized>(
    store: &S,
    month: u32,
    year: i32,
    operator: &str,
) -> Result<BatchOutcome> {
    let period = Period::month(month, year)?;
    let existing = store.fetch_settlements_for_period(&period)?;
    let mut outcome = compute_batch(store, period)?;
    let mut saved = Vec::with_capacity(outcome.settlements.len());
    for fresh in std::mem::take(&mut outcome.settlements) {
        let driver_id = fresh.driver_id;
        let driver_name = fresh.driver_name.clone();
        let result = match existing.iter().find(|e| e.driver_id == driver_id) {
            Some(e) => merge_preserving_bonus(e, fresh),
            None => Ok(fresh),
        }
        .and_then(|merged| {
            store.persist_settlement(&Settlement {
                operator: Some(operator.to_string()),
                ..merged
            })
        });
        match result {
            Ok(s) => saved.push(s),
            Err(err) => {
                tracing::warn!(driver_id, driver = %driver_name, %period, error = %err, "settlement not saved, skipping driver");
                outcome.failures.push(DriverFailure {
                    driver_id,
                    driver_name,
                    error: err.to_string(),
                });
            }
        }
    }
    outcome.settlements = saved;
    Ok(outcome)
}

/// Resolves a settlements-screen filter.
pub fn settlements_for<S: SettlementStore + ?Sized>(
    store: &S,
    filter: SettlementFilter,
) -> Result<Vec<Settlement>> {
    match filter {
        SettlementFilter::ByMonth { month, year } => {
            store.fetch_settlements_for_period(&Period::month(month, year)?)
        }
        SettlementFilter::ByDateRange { start, end } => {
            Ok(compute_batch(store, Period::range(start, end)?)?.settlements)
        }
        SettlementFilter::ByDriver { driver_id } => store.fetch_settlements_for_driver(driver_id),
    }
}

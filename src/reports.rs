// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{HaulError, Result};
use crate::models::{FreightRecord, FuelRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverFreightTotals {
    pub driver_id: i64,
    pub driver_name: String,
    pub freights: usize,
    pub total_value: Decimal,
    pub average_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelTypeTotals {
    pub fuel_type: String,
    pub fills: usize,
    pub liters: Decimal,
    pub total_value: Decimal,
    pub average_price_per_liter: Decimal,
}

fn average(total: Decimal, n: Decimal) -> Result<Decimal> {
    if n.is_zero() {
        return Ok(Decimal::ZERO);
    }
    total
        .checked_div(n)
        .map(|avg| avg.round_dp(2))
        .ok_or_else(|| HaulError::invalid(format!("Average of {} over {} is out of range", total, n)))
}

fn add_to(acc: &mut Decimal, v: Decimal, what: &str) -> Result<()> {
    *acc = acc
        .checked_add(v)
        .ok_or_else(|| HaulError::invalid(format!("{} is too large to total", what)))?;
    Ok(())
}

/// Sorted by total value, largest first. Unknown driver ids are labelled
/// with the id.
pub fn freight_by_driver(
    rows: &[FreightRecord],
    names: &HashMap<i64, String>,
) -> Result<Vec<DriverFreightTotals>> {
    let mut agg: HashMap<i64, (usize, Decimal)> = HashMap::new();
    for f in rows {
        let e = agg.entry(f.driver_id).or_insert((0, Decimal::ZERO));
        e.0 += 1;
        add_to(&mut e.1, f.value, "Freight value")?;
    }
    let mut out = agg
        .into_iter()
        .map(|(driver_id, (n, total))| {
            Ok(DriverFreightTotals {
                driver_id,
                driver_name: names
                    .get(&driver_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", driver_id)),
                freights: n,
                total_value: total,
                average_value: average(total, Decimal::from(n))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    out.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.driver_name.cmp(&b.driver_name))
    });
    Ok(out)
}

/// Sorted by fuel type name.
pub fn fuel_by_type(rows: &[FuelRecord]) -> Result<Vec<FuelTypeTotals>> {
    let mut agg: BTreeMap<String, (usize, Decimal, Decimal)> = BTreeMap::new();
    for f in rows {
        let key = f.fuel_type.trim().to_uppercase();
        let e = agg
            .entry(key)
            .or_insert((0, Decimal::ZERO, Decimal::ZERO));
        e.0 += 1;
        add_to(&mut e.1, f.liters, "Fuel liters")?;
        add_to(&mut e.2, f.total_value, "Fuel value")?;
    }
    agg.into_iter()
        .map(|(fuel_type, (n, liters, total))| {
            Ok(FuelTypeTotals {
                fuel_type,
                fills: n,
                liters,
                total_value: total,
                average_price_per_liter: average(total, liters)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FreightStatus;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn freight(driver_id: i64, value: &str) -> FreightRecord {
        FreightRecord {
            id: 0,
            date: d(1),
            driver_id,
            origin: None,
            destination: None,
            value: value.parse().unwrap(),
            status: FreightStatus::Pending,
        }
    }

    fn fuel(kind: &str, liters: &str, total: &str) -> FuelRecord {
        FuelRecord {
            id: 0,
            date: d(2),
            truck_plate: "ABC1D23".into(),
            fuel_type: kind.into(),
            liters: liters.parse().unwrap(),
            total_value: total.parse().unwrap(),
        }
    }

    #[test]
    fn groups_freight_by_driver() {
        let names = HashMap::from([(1, "Ana".to_string()), (2, "Bruno".to_string())]);
        let rows = vec![
            freight(1, "1000.00"),
            freight(2, "3000.00"),
            freight(1, "500.50"),
        ];
        let out = freight_by_driver(&rows, &names).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].driver_name, "Bruno");
        assert_eq!(out[1].freights, 2);
        assert_eq!(out[1].total_value.to_string(), "1500.50");
        assert_eq!(out[1].average_value.to_string(), "750.25");
    }

    #[test]
    fn fuel_type_names_fold_case() {
        let rows = vec![
            fuel("diesel s10", "100", "600.00"),
            fuel("Diesel S10", "50", "310.00"),
            fuel("arla", "20", "80.00"),
        ];
        let out = fuel_by_type(&rows).unwrap();
        assert_eq!(out[0].fuel_type, "ARLA");
        assert_eq!(out[1].fuel_type, "DIESEL S10");
        assert_eq!(out[1].fills, 2);
        assert_eq!(out[1].liters.to_string(), "150");
        assert_eq!(out[1].average_price_per_liter.to_string(), "6.07");
    }

    #[test]
    fn zero_liters_average_is_zero() {
        let out = fuel_by_type(&[fuel("gas", "0", "0")]).unwrap();
        assert!(out[0].average_price_per_liter.is_zero());
    }

    #[test]
    fn oversized_totals_are_rejected() {
        let rows = vec![
            freight(1, "50000000000000000000000000000"),
            freight(1, "50000000000000000000000000000"),
        ];
        assert!(matches!(
            freight_by_driver(&rows, &HashMap::new()),
            Err(HaulError::InvalidInput(_))
        ));
    }
}

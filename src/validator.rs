// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Arithmetic consistency checks for settlements.
//!
//! Nothing here fails: problems become `errors` (the settlement is not valid)
//! or `warnings` (advisory, never affect validity).

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Driver, Settlement};
use crate::settlement::{effective_rate, net_value};

/// One cent.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Gross value above which a settlement is flagged for review.
pub const HIGH_GROSS: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn validate(settlement: &Settlement, driver: &Driver) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (field, value) in [
        ("gross_value", settlement.gross_value),
        ("commission_value", settlement.commission_value),
        ("deductions", settlement.deductions),
        ("bonus", settlement.bonus),
    ] {
        if value < Decimal::ZERO {
            errors.push(format!("{} cannot be negative", field));
        }
    }

    match net_value(
        settlement.commission_value,
        settlement.deductions,
        settlement.bonus,
    ) {
        Some(expected_net) if within_tolerance(settlement.net_value, expected_net) => {}
        Some(expected_net) => errors.push(format!(
            "net_value mismatch: expected {:.2} (commission - deductions + bonus), found {:.2}",
            expected_net, settlement.net_value
        )),
        None => errors.push("net_value cannot be checked: amounts out of range".to_string()),
    }

    let rate = effective_rate(driver);
    match settlement.gross_value.checked_mul(rate) {
        Some(expected) if within_tolerance(settlement.commission_value, expected) => {}
        Some(expected) => errors.push(format!(
            "commission_value mismatch: expected {:.2} ({}% of gross {:.2}), found {:.2}",
            expected,
            (rate * Decimal::ONE_HUNDRED).normalize(),
            settlement.gross_value,
            settlement.commission_value
        )),
        None => {
            errors.push("commission_value cannot be checked: gross out of range".to_string())
        }
    }

    if settlement.gross_value > HIGH_GROSS {
        warnings.push(format!(
            "gross_value {:.2} is unusually high, verify",
            settlement.gross_value
        ));
    }
    if settlement.deductions > settlement.commission_value {
        warnings.push(format!(
            "deductions {:.2} exceed commission {:.2}, verify",
            settlement.deductions, settlement.commission_value
        ));
    }
    if settlement.net_value < Decimal::ZERO {
        warnings.push(format!(
            "net_value {:.2} is negative: driver owes money",
            settlement.net_value
        ));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn within_tolerance(found: Decimal, expected: Decimal) -> bool {
    found
        .checked_sub(expected)
        .is_some_and(|diff| diff.abs() <= TOLERANCE)
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverProblems {
    pub driver_name: String,
    pub period: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchValidation {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub problems: Vec<DriverProblems>,
}

/// Validates many settlements at once.
///
/// `invalid_count` counts only settlements with errors, but `problems` lists
/// every settlement with errors or warnings. A warnings-only entry therefore
/// shows up in `problems` while still counting as valid.
pub fn validate_batch<'a, I>(items: I) -> BatchValidation
where
    I: IntoIterator<Item = (&'a Settlement, &'a Driver)>,
{
    let mut out = BatchValidation::default();
    for (settlement, driver) in items {
        let r = validate(settlement, driver);
        out.total += 1;
        if r.valid {
            out.valid_count += 1;
        } else {
            out.invalid_count += 1;
        }
        if !r.errors.is_empty() || !r.warnings.is_empty() {
            out.problems.push(DriverProblems {
                driver_name: settlement.driver_name.clone(),
                period: settlement.period.to_string(),
                errors: r.errors,
                warnings: r.warnings,
            });
        }
    }
    out
}

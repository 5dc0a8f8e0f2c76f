// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HaulError;
use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverCategory {
    Employee,
    ThirdParty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub category: DriverCategory,
    pub custom_commission_percent: Option<Decimal>, // 0-100
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: i64,
    pub plate: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreightStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub driver_id: i64,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub value: Decimal,
    pub status: FreightStatus,
}

/// Cash advance ("vale") handed to a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRecord {
    pub id: i64,
    pub driver_id: i64,
    pub date: NaiveDate,
    pub value: Decimal,
    pub description: Option<String>,
    pub period: String, // MM/YYYY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub truck_plate: String,
    pub fuel_type: String,
    pub liters: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Paid,
    Late,
    /// Real-time result over an ad-hoc range; never stored.
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Option<i64>,
    pub driver_id: i64,
    pub driver_name: String,
    pub period: Period,
    pub total_freights: u32,
    pub gross_value: Decimal,
    pub commission_value: Decimal,
    pub deductions: Decimal,
    pub bonus: Decimal,
    pub net_value: Decimal,
    pub status: SettlementStatus,
    pub operator: Option<String>,
}

macro_rules! text_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = HaulError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(HaulError::invalid(format!(
                        concat!("Unknown ", $what, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(DriverCategory, "driver category", {
    Employee => "employee",
    ThirdParty => "third-party",
});

text_enum!(FreightStatus, "freight status", {
    Pending => "pending",
    Paid => "paid",
});

text_enum!(SettlementStatus, "settlement status", {
    Pending => "pending",
    Paid => "paid",
    Late => "late",
    Calculated => "calculated",
});

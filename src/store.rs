// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Data access for the settlement core.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{HaulError, Result};
use crate::models::{
    AdvanceRecord, Driver, DriverCategory, FreightRecord, FuelRecord, Settlement,
    SettlementStatus,
};
use crate::period::Period;

/// Logical operations the settlement core needs from persistence.
///
/// Single-record reads return `Ok(None)` for a missing id. Transport or query
/// failures come back as [`HaulError::StoreUnavailable`].
pub trait SettlementStore {
    fn fetch_freight_records(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FreightRecord>>;

    fn fetch_advance_records(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>>;

    fn fetch_driver(&self, driver_id: i64) -> Result<Option<Driver>>;

    /// Drivers whose status is `active` or unset.
    fn fetch_active_drivers(&self) -> Result<Vec<Driver>>;

    /// Creates the settlement, or updates it when it has an id or when one
    /// already exists for the same driver and period.
    fn persist_settlement(&self, settlement: &Settlement) -> Result<Settlement>;

    fn fetch_settlement(&self, id: i64) -> Result<Option<Settlement>>;

    fn fetch_settlements_for_period(&self, period: &Period) -> Result<Vec<Settlement>>;

    fn fetch_settlements_for_driver(&self, driver_id: i64) -> Result<Vec<Settlement>>;

    fn fetch_all_settlements(&self) -> Result<Vec<Settlement>>;

    fn delete_settlement(&self, id: i64) -> Result<()>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        self.conn
    }

    pub fn all_drivers(&self) -> Result<Vec<Driver>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY name", DRIVER_SELECT))?;
        let rows = stmt.query_map([], RawDriver::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_driver()?);
        }
        Ok(out)
    }

    /// Freight of every driver issued within the range, oldest first.
    pub fn freight_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FreightRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, driver_id, origin, destination, value, status
             FROM freights WHERE date>=?1 AND date<=?2 ORDER BY date, id",
        )?;
        let rows = stmt.query_map(
            params![start.to_string(), end.to_string()],
            RawFreight::from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        Ok(out)
    }

    pub fn fuel_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FuelRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.date, t.plate, f.fuel_type, f.liters, f.total_value
             FROM fuel_logs f JOIN trucks t ON f.truck_id=t.id
             WHERE f.date>=?1 AND f.date<=?2 ORDER BY f.date, f.id",
        )?;
        let rows = stmt.query_map(params![start.to_string(), end.to_string()], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, date, plate, fuel_type, liters, total) = row?;
            out.push(FuelRecord {
                id,
                date: stored_date(&date)?,
                truck_plate: plate,
                fuel_type,
                liters: stored_decimal(&liters, "fuel_logs.liters")?,
                total_value: stored_decimal(&total, "fuel_logs.total_value")?,
            });
        }
        Ok(out)
    }

    fn query_settlements(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Settlement>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} {} ORDER BY d.name, s.id", SETTLEMENT_SELECT, filter))?;
        let rows = stmt.query_map(args, RawSettlement::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_settlement()?);
        }
        Ok(out)
    }

    fn settlement_id_for(&self, driver_id: i64, period: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT id FROM settlements WHERE driver_id=?1 AND period=?2",
            params![driver_id, period],
            |r| r.get(0),
        )?)
    }
}

impl SettlementStore for SqliteStore<'_> {
    fn fetch_freight_records(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FreightRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, date, driver_id, origin, destination, value, status
             FROM freights WHERE driver_id=?1 AND date>=?2 AND date<=?3 ORDER BY date, id",
        )?;
        let rows = stmt.query_map(
            params![driver_id, start.to_string(), end.to_string()],
            RawFreight::from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        Ok(out)
    }

    fn fetch_advance_records(
        &self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AdvanceRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, driver_id, date, value, description, period
             FROM advances WHERE driver_id=?1 AND date>=?2 AND date<=?3 ORDER BY date, id",
        )?;
        let rows = stmt.query_map(
            params![driver_id, start.to_string(), end.to_string()],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, Option<String>>(4)?,
                    r.get::<_, String>(5)?,
                ))
            },
        )?;
        let mut out = Vec::new();
        for row in rows {
            let (id, driver_id, date, value, description, period) = row?;
            out.push(AdvanceRecord {
                id,
                driver_id,
                date: stored_date(&date)?,
                value: stored_decimal(&value, "advances.value")?,
                description,
                period,
            });
        }
        Ok(out)
    }

    fn fetch_driver(&self, driver_id: i64) -> Result<Option<Driver>> {
        let raw = self
            .conn
            .query_row(
                &format!("{} WHERE id=?1", DRIVER_SELECT),
                params![driver_id],
                RawDriver::from_row,
            )
            .optional()?;
        raw.map(RawDriver::into_driver).transpose()
    }

    fn fetch_active_drivers(&self) -> Result<Vec<Driver>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE status IS NULL OR status='active' ORDER BY name",
            DRIVER_SELECT
        ))?;
        let rows = stmt.query_map([], RawDriver::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_driver()?);
        }
        Ok(out)
    }

    fn persist_settlement(&self, s: &Settlement) -> Result<Settlement> {
        if s.status == SettlementStatus::Calculated {
            return Err(HaulError::invalid(format!(
                "Real-time result for {} is not persisted; compute it for a calendar month",
                s.period
            )));
        }
        let period = s.period.to_string();
        let id = match s.id {
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE settlements SET driver_id=?2, period=?3, total_freights=?4,
                        gross_value=?5, commission_value=?6, deductions=?7, bonus=?8,
                        net_value=?9, status=?10, operator=?11, updated_at=datetime('now')
                     WHERE id=?1",
                    params![
                        id,
                        s.driver_id,
                        period,
                        s.total_freights,
                        s.gross_value.to_string(),
                        s.commission_value.to_string(),
                        s.deductions.to_string(),
                        s.bonus.to_string(),
                        s.net_value.to_string(),
                        s.status.as_str(),
                        s.operator,
                    ],
                )?;
                if changed == 0 {
                    return Err(HaulError::not_found("settlement", id));
                }
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO settlements(driver_id, period, total_freights, gross_value,
                        commission_value, deductions, bonus, net_value, status, operator)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                     ON CONFLICT(driver_id, period) DO UPDATE SET
                        total_freights=excluded.total_freights,
                        gross_value=excluded.gross_value,
                        commission_value=excluded.commission_value,
                        deductions=excluded.deductions,
                        bonus=excluded.bonus,
                        net_value=excluded.net_value,
                        status=excluded.status,
                        operator=excluded.operator,
                        updated_at=datetime('now')",
                    params![
                        s.driver_id,
                        period,
                        s.total_freights,
                        s.gross_value.to_string(),
                        s.commission_value.to_string(),
                        s.deductions.to_string(),
                        s.bonus.to_string(),
                        s.net_value.to_string(),
                        s.status.as_str(),
                        s.operator,
                    ],
                )?;
                self.settlement_id_for(s.driver_id, &period)?
            }
        };
        tracing::info!(settlement_id = id, driver_id = s.driver_id, period = %s.period, "settlement persisted");
        Ok(Settlement {
            id: Some(id),
            ..s.clone()
        })
    }

    fn fetch_settlement(&self, id: i64) -> Result<Option<Settlement>> {
        let raw = self
            .conn
            .query_row(
                &format!("{} WHERE s.id=?1", SETTLEMENT_SELECT),
                params![id],
                RawSettlement::from_row,
            )
            .optional()?;
        raw.map(RawSettlement::into_settlement).transpose()
    }

    fn fetch_settlements_for_period(&self, period: &Period) -> Result<Vec<Settlement>> {
        let p = period.to_string();
        self.query_settlements("WHERE s.period=?1", &[&p])
    }

    fn fetch_settlements_for_driver(&self, driver_id: i64) -> Result<Vec<Settlement>> {
        self.query_settlements("WHERE s.driver_id=?1", &[&driver_id])
    }

    fn fetch_all_settlements(&self) -> Result<Vec<Settlement>> {
        self.query_settlements("", &[])
    }

    fn delete_settlement(&self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM settlements WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(HaulError::not_found("settlement", id));
        }
        Ok(())
    }
}

const DRIVER_SELECT: &str =
    "SELECT id, name, category, commission_percent, status FROM drivers";

const SETTLEMENT_SELECT: &str = "SELECT s.id, s.driver_id, d.name, s.period, s.total_freights,
        s.gross_value, s.commission_value, s.deductions, s.bonus, s.net_value, s.status, s.operator
     FROM settlements s JOIN drivers d ON s.driver_id=d.id";

pub(crate) fn stored_decimal(s: &str, column: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| HaulError::Corrupt(format!("{} = '{}'", column, s)))
}

fn stored_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| HaulError::Corrupt(format!("date '{}'", s)))
}

struct RawDriver {
    id: i64,
    name: String,
    category: String,
    commission: Option<String>,
    status: Option<String>,
}

impl RawDriver {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            name: r.get(1)?,
            category: r.get(2)?,
            commission: r.get(3)?,
            status: r.get(4)?,
        })
    }

    fn into_driver(self) -> Result<Driver> {
        let category: DriverCategory = self
            .category
            .parse()
            .map_err(|_| HaulError::Corrupt(format!("drivers.category = '{}'", self.category)))?;
        let custom_commission_percent = match self.commission.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(p) => Some(stored_decimal(p, "drivers.commission_percent")?),
        };
        Ok(Driver {
            id: self.id,
            name: self.name,
            category,
            custom_commission_percent,
            active: self.status.as_deref().is_none_or(|s| s == "active"),
        })
    }
}

struct RawFreight {
    id: i64,
    date: String,
    driver_id: i64,
    origin: Option<String>,
    destination: Option<String>,
    value: String,
    status: String,
}

impl RawFreight {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            date: r.get(1)?,
            driver_id: r.get(2)?,
            origin: r.get(3)?,
            destination: r.get(4)?,
            value: r.get(5)?,
            status: r.get(6)?,
        })
    }

    fn into_record(self) -> Result<FreightRecord> {
        Ok(FreightRecord {
            id: self.id,
            date: stored_date(&self.date)?,
            driver_id: self.driver_id,
            origin: self.origin,
            destination: self.destination,
            value: stored_decimal(&self.value, "freights.value")?,
            status: self
                .status
                .parse()
                .map_err(|_| HaulError::Corrupt(format!("freights.status = '{}'", self.status)))?,
        })
    }
}

struct RawSettlement {
    id: i64,
    driver_id: i64,
    driver_name: String,
    period: String,
    total_freights: u32,
    gross: String,
    commission: String,
    deductions: String,
    bonus: String,
    net: String,
    status: String,
    operator: Option<String>,
}

impl RawSettlement {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            driver_id: r.get(1)?,
            driver_name: r.get(2)?,
            period: r.get(3)?,
            total_freights: r.get(4)?,
            gross: r.get(5)?,
            commission: r.get(6)?,
            deductions: r.get(7)?,
            bonus: r.get(8)?,
            net: r.get(9)?,
            status: r.get(10)?,
            operator: r.get(11)?,
        })
    }

    fn into_settlement(self) -> Result<Settlement> {
        Ok(Settlement {
            id: Some(self.id),
            driver_id: self.driver_id,
            driver_name: self.driver_name,
            period: self
                .period
                .parse()
                .map_err(|_| HaulError::Corrupt(format!("settlements.period = '{}'", self.period)))?,
            total_freights: self.total_freights,
            gross_value: stored_decimal(&self.gross, "settlements.gross_value")?,
            commission_value: stored_decimal(&self.commission, "settlements.commission_value")?,
            deductions: stored_decimal(&self.deductions, "settlements.deductions")?,
            bonus: stored_decimal(&self.bonus, "settlements.bonus")?,
            net_value: stored_decimal(&self.net, "settlements.net_value")?,
            status: self
                .status
                .parse()
                .map_err(|_| HaulError::Corrupt(format!("settlements.status = '{}'", self.status)))?,
            operator: self.operator,
        })
    }
}

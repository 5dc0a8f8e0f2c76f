// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::Duration;
use rusqlite::{Connection, OptionalExtension, params};

pub const OPERATOR_ENV: &str = "HAULBOOK_OPERATOR";

pub const KEY_CURRENCY_SYMBOL: &str = "currency_symbol";
pub const KEY_OPERATOR: &str = "operator";
pub const KEY_SESSION_TTL: &str = "session_ttl_minutes";

pub const KNOWN_KEYS: [&str; 3] = [KEY_CURRENCY_SYMBOL, KEY_OPERATOR, KEY_SESSION_TTL];

const DEFAULT_CURRENCY_SYMBOL: &str = "R$";
const DEFAULT_SESSION_TTL: i64 = 480;
/// One week.
pub const MAX_SESSION_TTL: i64 = 7 * 24 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub currency_symbol: String,
    pub operator: String,
    pub session_ttl_minutes: i64,
}

impl AppConfig {
    /// Settings table, with `HAULBOOK_OPERATOR` (then `USER`) standing in for
    /// an unset operator.
    pub fn load(conn: &Connection) -> Result<Self> {
        let currency_symbol = get_setting(conn, KEY_CURRENCY_SYMBOL)?
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());
        let operator = match std::env::var(OPERATOR_ENV) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => get_setting(conn, KEY_OPERATOR)?
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "operator".to_string()),
        };
        // A bad stored lifetime must not block `config set` from repairing it.
        let session_ttl_minutes = match get_setting(conn, KEY_SESSION_TTL)? {
            Some(v) => parse_ttl(&v).unwrap_or_else(|err| {
                tracing::warn!(value = %v, error = %err, "ignoring stored session lifetime");
                DEFAULT_SESSION_TTL
            }),
            None => DEFAULT_SESSION_TTL,
        };
        Ok(Self {
            currency_symbol,
            operator,
            session_ttl_minutes,
        })
    }

    pub fn session_ttl(&self) -> Result<Duration> {
        let minutes = parse_ttl(&self.session_ttl_minutes.to_string())?;
        Duration::try_minutes(minutes)
            .ok_or_else(|| anyhow!("{} is out of range", KEY_SESSION_TTL))
    }
}

fn parse_ttl(raw: &str) -> Result<i64> {
    let minutes = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("Invalid {} '{}'", KEY_SESSION_TTL, raw.trim()))?;
    if minutes <= 0 || minutes > MAX_SESSION_TTL {
        return Err(anyhow!(
            "{} must be between 1 and {}, got {}",
            KEY_SESSION_TTL,
            MAX_SESSION_TTL,
            minutes
        ));
    }
    Ok(minutes)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let key = key.trim();
    if !KNOWN_KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        ));
    }
    if key == KEY_SESSION_TTL {
        parse_ttl(value)?;
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}

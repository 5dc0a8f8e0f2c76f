// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{AppConfig, set_setting};
use crate::db::db_path;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let cfg = AppConfig::load(conn)?;
            let rows = vec![
                vec!["database".to_string(), db_path()?.display().to_string()],
                vec!["currency_symbol".to_string(), cfg.currency_symbol],
                vec!["operator".to_string(), cfg.operator],
                vec![
                    "session_ttl_minutes".to_string(),
                    cfg.session_ttl_minutes.to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            println!("{} = {}", key.trim(), value.trim());
        }
        _ => {}
    }
    Ok(())
}

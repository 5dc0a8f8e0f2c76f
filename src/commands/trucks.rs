// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{normalize_plate, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let plate = normalize_plate(sub.get_one::<String>("plate").unwrap());
            if plate.is_empty() {
                return Err(anyhow!("Plate cannot be empty"));
            }
            let model = sub
                .get_one::<String>("model")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            conn.execute(
                "INSERT INTO trucks(plate, model) VALUES (?1, ?2)",
                params![plate, model],
            )?;
            println!("Added truck {}", plate);
        }
        Some(("list", _)) => {
            let mut stmt =
                conn.prepare("SELECT plate, COALESCE(model,'') FROM trucks ORDER BY plate")?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (p, m) = row?;
                data.push(vec![p, m]);
            }
            println!("{}", pretty_table(&["Plate", "Model"], data));
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use clap::ArgMatches;
use rusqlite::Connection;

use haulbook::{cli, commands, config::AppConfig, db, logging, session::Session};

fn main() -> Result<()> {
    logging::init("warn");
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let cfg = AppConfig::load(&conn)?;
    let mut session = Session::login(
        &cfg.operator,
        cfg.session_ttl()?,
        Local::now().naive_local(),
    )?;

    let outcome = dispatch(&conn, &matches, &session, &cfg);
    session.logout();
    outcome
}

fn dispatch(conn: &Connection, matches: &ArgMatches, session: &Session, cfg: &AppConfig) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("driver", sub)) => commands::drivers::handle(conn, sub)?,
        Some(("truck", sub)) => commands::trucks::handle(conn, sub)?,
        Some(("freight", sub)) => commands::freights::handle(conn, sub)?,
        Some(("advance", sub)) => commands::advances::handle(conn, sub)?,
        Some(("fuel", sub)) => commands::fuel::handle(conn, sub)?,
        Some(("settle", sub)) => commands::settlements::handle(conn, sub, session, cfg)?,
        Some(("report", sub)) => commands::reports::handle(conn, sub, cfg)?,
        Some(("export", sub)) => commands::exporter::handle(conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(conn, sub)?,
        Some(("config", sub)) => commands::config::handle(conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

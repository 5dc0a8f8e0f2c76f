// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, Local};
use haulbook::commands::{advances, doctor, drivers, exporter, freights, settlements};
use haulbook::config::{AppConfig, get_setting, set_setting};
use haulbook::error::HaulError;
use haulbook::session::Session;
use haulbook::{cli, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn session() -> Session {
    Session::login("tester", Duration::hours(1), Local::now().naive_local()).unwrap()
}

fn cfg() -> AppConfig {
    AppConfig {
        currency_symbol: "R$".into(),
        operator: "tester".into(),
        session_ttl_minutes: 60,
    }
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["haulbook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("driver", m)) => drivers::handle(conn, m),
        Some(("freight", m)) => freights::handle(conn, m),
        Some(("advance", m)) => advances::handle(conn, m),
        Some(("settle", m)) => settlements::handle(conn, m, &session(), &cfg()),
        Some(("export", m)) => exporter::handle(conn, m),
        other => panic!("unexpected command {:?}", other.map(|o| o.0)),
    }
}

fn seed_january(conn: &Connection) {
    run(conn, &["driver", "add", "--name", " Dario ", "--category", "third-party"]).unwrap();
    run(conn, &["driver", "add", "--name", "Eva", "--category", "employee", "--commission", "20"]).unwrap();
    run(conn, &["freight", "add", "--date", "05/01/2024", "--driver", "Dario", "--value", "6000,00"]).unwrap();
    run(conn, &["freight", "add", "--date", "2024-01-31", "--driver", "Dario", "--value", "4000.00"]).unwrap();
    run(conn, &["freight", "add", "--date", "2024-01-15", "--driver", "Eva", "--value", "1000.00"]).unwrap();
    run(conn, &["advance", "add", "--driver", "Dario", "--date", "2024-01-10", "--value", "1500.00"]).unwrap();
}

fn settlement_id(conn: &Connection, driver: &str) -> i64 {
    conn.query_row(
        "SELECT s.id FROM settlements s JOIN drivers d ON s.driver_id=d.id WHERE d.name=?1",
        params![driver],
        |r| r.get(0),
    )
    .unwrap()
}

fn stored(conn: &Connection, id: i64, column: &str) -> Decimal {
    let v: String = conn
        .query_row(
            &format!("SELECT {} FROM settlements WHERE id=?1", column),
            params![id],
            |r| r.get(0),
        )
        .unwrap();
    v.parse().unwrap()
}

#[test]
fn driver_add_validates_inputs() {
    let conn = setup();
    assert!(run(&conn, &["driver", "add", "--name", "X", "--category", "contractor"]).is_err());
    assert!(
        run(&conn, &["driver", "add", "--name", "X", "--category", "employee", "--commission", "101"])
            .is_err()
    );
    run(&conn, &["driver", "add", "--name", "X", "--category", "EMPLOYEE"]).unwrap();
    let (cat, pct): (String, Option<String>) = conn
        .query_row(
            "SELECT category, commission_percent FROM drivers WHERE name='X'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(cat, "employee");
    assert_eq!(pct, None);
}

#[test]
fn freight_rejects_negative_value() {
    let conn = setup();
    run(&conn, &["driver", "add", "--name", "Dario", "--category", "third-party"]).unwrap();
    let err = run(
        &conn,
        &["freight", "add", "--date", "2024-01-05", "--driver", "Dario", "--value=-1"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("cannot be negative"));
}

#[test]
fn amounts_above_entry_cap_are_rejected() {
    let conn = setup();
    run(&conn, &["driver", "add", "--name", "Dario", "--category", "third-party"]).unwrap();
    let err = run(
        &conn,
        &["freight", "add", "--date", "2024-01-05", "--driver", "Dario", "--value", "50000000000000000000000000000"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("exceeds the maximum"));
    run(&conn, &["freight", "add", "--date", "2024-01-05", "--driver", "Dario", "--value", "1000000000000"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM freights", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn advance_records_derived_period() {
    let conn = setup();
    run(&conn, &["driver", "add", "--name", "Dario", "--category", "third-party"]).unwrap();
    run(&conn, &["advance", "add", "--driver", "Dario", "--date", "31/03/2024", "--value", "10"]).unwrap();
    let period: String = conn
        .query_row("SELECT period FROM advances", [], |r| r.get(0))
        .unwrap();
    assert_eq!(period, "03/2024");
}

#[test]
fn freight_list_filters_by_driver_and_range() {
    let conn = setup();
    seed_january(&conn);
    let matches = cli::build_cli().get_matches_from([
        "haulbook", "freight", "list", "--driver", "Dario", "--from", "2024-01-10", "--to", "2024-01-31",
    ]);
    let Some(("freight", fm)) = matches.subcommand() else {
        panic!("no freight subcommand");
    };
    let Some(("list", lm)) = fm.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = freights::query_rows(&conn, lm).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2024-01-31");
    assert_eq!(rows[0].value, "4000.00");
}

#[test]
fn settle_run_then_bonus_then_recompute() {
    let conn = setup();
    seed_january(&conn);

    run(&conn, &["settle", "run", "--month", "01/2024"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM settlements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let dario = settlement_id(&conn, "Dario");
    assert_eq!(stored(&conn, dario, "commission_value"), Decimal::from(9000));
    assert_eq!(stored(&conn, dario, "net_value"), Decimal::from(7500));
    let eva = settlement_id(&conn, "Eva");
    assert_eq!(stored(&conn, eva, "commission_value"), Decimal::from(200));

    let id = dario.to_string();
    run(&conn, &["settle", "bonus", "--id", &id, "--amount", "200"]).unwrap();
    assert_eq!(stored(&conn, dario, "net_value"), Decimal::from(7700));

    run(&conn, &["freight", "add", "--date", "2024-01-20", "--driver", "Dario", "--value", "1000"]).unwrap();
    run(&conn, &["settle", "recompute", "--id", &id]).unwrap();
    assert_eq!(stored(&conn, dario, "bonus"), Decimal::from(200));
    assert_eq!(stored(&conn, dario, "commission_value"), Decimal::from(9900));
    assert_eq!(stored(&conn, dario, "net_value"), Decimal::from(8600));

    let operator: String = conn
        .query_row("SELECT operator FROM settlements WHERE id=?1", params![dario], |r| r.get(0))
        .unwrap();
    assert_eq!(operator, "tester");
}

#[test]
fn settle_bonus_rejects_malformed_amount() {
    let conn = setup();
    seed_january(&conn);
    run(&conn, &["settle", "run", "--month", "2024-01"]).unwrap();
    let id = settlement_id(&conn, "Dario").to_string();

    let err = run(&conn, &["settle", "bonus", "--id", &id, "--amount", "lots"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HaulError>(),
        Some(HaulError::InvalidInput(_))
    ));
    let err = run(&conn, &["settle", "bonus", "--id", &id, "--amount=-10"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HaulError>(),
        Some(HaulError::InvalidInput(_))
    ));
}

#[test]
fn settle_status_on_missing_id_is_not_found() {
    let conn = setup();
    let err = run(&conn, &["settle", "status", "--id", "99", "--set", "paid"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HaulError>(),
        Some(HaulError::NotFound { entity: "settlement", id: 99 })
    ));
}

#[test]
fn settle_run_requires_live_session() {
    let conn = setup();
    seed_january(&conn);
    let stale = Session::login(
        "tester",
        Duration::minutes(5),
        Local::now().naive_local() - Duration::hours(2),
    )
    .unwrap();
    let matches = cli::build_cli().get_matches_from(["haulbook", "settle", "run", "--month", "01/2024"]);
    let Some(("settle", m)) = matches.subcommand() else {
        panic!("no settle subcommand");
    };
    let err = settlements::handle(&conn, m, &stale, &cfg()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HaulError>(),
        Some(HaulError::SessionExpired(_))
    ));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM settlements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn settlement_list_filter_args_are_exclusive_variants() {
    let conn = setup();
    seed_january(&conn);
    let matches = cli::build_cli().get_matches_from([
        "haulbook", "settle", "list", "--from", "01/01/2024", "--to", "15/01/2024",
    ]);
    let Some(("settle", sm)) = matches.subcommand() else {
        panic!("no settle subcommand");
    };
    let Some(("list", lm)) = sm.subcommand() else {
        panic!("no list subcommand");
    };
    let filter = settlements::filter_args(&conn, lm).unwrap();
    assert!(matches!(
        filter,
        haulbook::period::SettlementFilter::ByDateRange { .. }
    ));
}

#[test]
fn export_settlement_json_keeps_validation() {
    let conn = setup();
    seed_january(&conn);
    run(&conn, &["settle", "run", "--month", "01/2024"]).unwrap();
    let id = settlement_id(&conn, "Dario");
    // corrupt the stored net to force a validation error
    conn.execute(
        "UPDATE settlements SET net_value='7000.00' WHERE id=?1",
        params![id],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("dario.json");
    let out_s = out.to_string_lossy().to_string();
    let id_s = id.to_string();
    run(&conn, &["export", "settlement", "--id", &id_s, "--format", "json", "--out", &out_s]).unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["settlement"]["period"], "01/2024");
    assert_eq!(doc["freights"].as_array().unwrap().len(), 2);
    assert_eq!(doc["advances"].as_array().unwrap().len(), 1);
    assert_eq!(doc["validation"]["valid"], false);
    let errors = doc["validation"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("7500.00"));
}

#[test]
fn export_settlement_csv_has_summary_rows() {
    let conn = setup();
    seed_january(&conn);
    run(&conn, &["settle", "run", "--month", "01/2024"]).unwrap();
    let id = settlement_id(&conn, "Dario").to_string();

    let dir = tempdir().unwrap();
    let out = dir.path().join("dario.csv");
    let out_s = out.to_string_lossy().to_string();
    run(&conn, &["export", "settlement", "--id", &id, "--format", "csv", "--out", &out_s]).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.iter().filter(|r| &r[0] == "freight").count(), 2);
    assert_eq!(records.iter().filter(|r| &r[0] == "advance").count(), 1);
    let net = records
        .iter()
        .find(|r| &r[0] == "summary" && &r[2] == "net_value")
        .unwrap();
    assert_eq!(&net[4], "7500.00");
    assert!(records.iter().all(|r| &r[0] != "error"));
}

#[test]
fn export_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("x.xml");
    let out_s = out.to_string_lossy().to_string();
    assert!(run(&conn, &["export", "settlement", "--id", "1", "--format", "xml", "--out", &out_s]).is_err());
    assert!(!out.exists());
}

#[test]
fn doctor_reports_broken_and_warning_only_settlements() {
    let conn = setup();
    seed_january(&conn);
    run(&conn, &["advance", "add", "--driver", "Eva", "--date", "2024-01-16", "--value", "500"]).unwrap();
    run(&conn, &["settle", "run", "--month", "01/2024"]).unwrap();
    let dario = settlement_id(&conn, "Dario");
    conn.execute(
        "UPDATE settlements SET commission_value='100' WHERE id=?1",
        params![dario],
    )
    .unwrap();

    let report = doctor::check(&conn).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.invalid_count, 1);
    assert_eq!(report.valid_count, 1);
    // Eva: advances exceed commission, warning only
    assert_eq!(report.problems.len(), 2);
}

#[test]
fn config_rejects_unknown_keys_and_bad_ttl() {
    let conn = setup();
    assert!(set_setting(&conn, "colour", "blue").is_err());
    assert!(set_setting(&conn, "session_ttl_minutes", "0").is_err());
    set_setting(&conn, " currency_symbol ", " US$ ").unwrap();
    assert_eq!(get_setting(&conn, "currency_symbol").unwrap().as_deref(), Some("US$"));
    let cfg = AppConfig::load(&conn).unwrap();
    assert_eq!(cfg.currency_symbol, "US$");
    assert_eq!(cfg.session_ttl_minutes, 480);
}

#[test]
fn session_lifetime_is_bounded() {
    let conn = setup();
    assert!(set_setting(&conn, "session_ttl_minutes", "1000000000000").is_err());
    assert!(set_setting(&conn, "session_ttl_minutes", "10081").is_err());
    set_setting(&conn, "session_ttl_minutes", "10080").unwrap();
    assert_eq!(AppConfig::load(&conn).unwrap().session_ttl_minutes, 10080);

    // a value written behind our back falls back to the default
    conn.execute(
        "UPDATE settings SET value='1000000000000' WHERE key='session_ttl_minutes'",
        [],
    )
    .unwrap();
    let cfg = AppConfig::load(&conn).unwrap();
    assert_eq!(cfg.session_ttl_minutes, 480);
    let ttl = cfg.session_ttl().unwrap();
    assert!(Session::login("ana", ttl, Local::now().naive_local()).is_ok());

    let forged = AppConfig {
        session_ttl_minutes: i64::MAX,
        ..cfg
    };
    assert!(forged.session_ttl().is_err());
}

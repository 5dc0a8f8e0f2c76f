// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, crate_version};

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn req(name: &'static str) -> Arg {
    opt(name).required(true)
}

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

fn id_arg() -> Arg {
    req("id").help("Settlement id")
}

pub fn build_cli() -> Command {
    Command::new("haulbook")
        .version(crate_version!())
        .about("Freight, fuel and driver settlement ledger")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("driver")
                .about("Driver registry")
                .subcommand(
                    Command::new("add")
                        .arg(req("name"))
                        .arg(req("category").help("employee | third-party"))
                        .arg(opt("commission").help("Custom commission percent (0-100)")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("status")
                        .arg(req("name"))
                        .arg(req("set").help("active | inactive")),
                )
                .subcommand(
                    Command::new("commission")
                        .arg(req("name"))
                        .arg(opt("percent"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .help("Fall back to the category default"),
                        )
                        .group(
                            ArgGroup::new("value")
                                .args(["percent", "clear"])
                                .required(true),
                        ),
                ),
        )
        .subcommand(
            Command::new("truck")
                .about("Truck registry")
                .subcommand(Command::new("add").arg(req("plate")).arg(opt("model")))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("freight")
                .about("Freight control")
                .subcommand(
                    Command::new("add")
                        .arg(req("date").help("YYYY-MM-DD or DD/MM/YYYY"))
                        .arg(req("driver"))
                        .arg(req("value"))
                        .arg(opt("origin"))
                        .arg(opt("destination"))
                        .arg(opt("status").default_value("pending")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("driver"))
                        .arg(opt("from"))
                        .arg(opt("to"))
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("status")
                        .arg(req("id"))
                        .arg(req("set").help("pending | paid")),
                ),
        )
        .subcommand(
            Command::new("advance")
                .about("Cash advances (vales)")
                .subcommand(
                    Command::new("add")
                        .arg(req("driver"))
                        .arg(req("date"))
                        .arg(req("value"))
                        .arg(opt("description")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("driver"))
                        .arg(opt("period").help("MM/YYYY"))
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("fuel")
                .about("Fuel log")
                .subcommand(
                    Command::new("add")
                        .arg(req("date"))
                        .arg(req("truck"))
                        .arg(req("type"))
                        .arg(req("liters"))
                        .arg(req("total")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("from"))
                        .arg(opt("to"))
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("settle")
                .about("Driver settlements")
                .subcommand(
                    Command::new("calc")
                        .about("Compute one driver's settlement without saving")
                        .arg(req("driver"))
                        .arg(req("period").help("MM/YYYY or DD/MM/YYYY - DD/MM/YYYY"))
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("run")
                        .about("Compute and save a month for every active driver")
                        .arg(req("month").help("MM/YYYY")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("month"))
                        .arg(opt("from"))
                        .arg(opt("to").requires("from"))
                        .arg(opt("driver"))
                        .group(
                            ArgGroup::new("filter")
                                .args(["month", "from", "driver"])
                                .required(true),
                        )
                        .args(json_flags()),
                )
                .subcommand(Command::new("show").arg(id_arg()).args(json_flags()))
                .subcommand(Command::new("recompute").arg(id_arg()))
                .subcommand(Command::new("bonus").arg(id_arg()).arg(req("amount")))
                .subcommand(
                    Command::new("status")
                        .arg(id_arg())
                        .arg(req("set").help("pending | paid | late")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregate reports")
                .subcommand(
                    Command::new("freight")
                        .arg(req("from"))
                        .arg(req("to"))
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("fuel")
                        .arg(req("from"))
                        .arg(req("to"))
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a settlement report")
                .subcommand(
                    Command::new("settlement")
                        .arg(id_arg())
                        .arg(req("format").help("csv | json"))
                        .arg(req("out")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Validate every stored settlement")
                .args(json_flags()),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("show"))
                .subcommand(Command::new("set").arg(req("key")).arg(req("value"))),
        )
}

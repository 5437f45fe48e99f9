// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

/// Arguments shared by everything that writes a full transaction record.
fn record_args(cmd: Command, date_arg: &'static str, date_required: bool) -> Command {
    cmd.arg(
        Arg::new(date_arg)
            .long(date_arg)
            .required(date_required)
            .help("YYYY-MM-DD"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .required(true)
            .help("income | expense"),
    )
    .arg(Arg::new("category").long("category").required(true))
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(true)
            .allow_hyphen_values(true)
            .help("Magnitude; expenses are stored as negative"),
    )
    .arg(Arg::new("comment").long("comment"))
}

pub fn build_cli() -> Command {
    Command::new("moneymanager")
        .about("Personal income/expense tracker with recurring monthly transactions")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("MONEYMANAGER_DB")
                .help("Path to the SQLite database (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Treat this YYYY-MM-DD as the current date"),
        )
        .subcommand(Command::new("init").about("Create the database if it does not exist"))
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(record_args(
                    Command::new("add").about("Record a transaction"),
                    "date",
                    false,
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions (generates due recurring ones first)")
                        .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .conflicts_with_all(["from", "to"])
                                .help("YYYY-MM"),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("type").long("type"))
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Substring of comment or category"),
                        )
                        .arg(Arg::new("min").long("min").help("Minimum absolute amount"))
                        .arg(Arg::new("max").long("max").help("Maximum absolute amount"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show one transaction")
                        .arg(id_arg()),
                ))
                .subcommand(record_args(
                    Command::new("edit")
                        .about("Replace every field of a transaction")
                        .arg(id_arg()),
                    "date",
                    true,
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("fixed")
                .about("Manage recurring monthly transactions")
                .subcommand(record_args(
                    Command::new("add").about("Add a monthly template anchored on --start"),
                    "start",
                    false,
                ))
                .subcommand(json_flags(Command::new("list").about("List templates")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a template (generated transactions are kept)")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("sync")
                        .about("Generate every due occurrence now")
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Only show what would be generated"),
                        ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category limits")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Monthly limit; 0 disables the warning"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(
                    Command::new("status")
                        .arg(Arg::new("month").long("month").help("YYYY-MM (default: current)")),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Monthly and yearly summaries")
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("month")
                            .long("month")
                            .required(true)
                            .help("YYYY-MM"),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("yearly").arg(
                        Arg::new("year")
                            .long("year")
                            .required(true)
                            .value_parser(value_parser!(i32)),
                    ),
                )),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv | json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .about("Import CSV with columns date,type,category,amount,comment")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("settings")
                .about("Display settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("currency")
                        .arg(Arg::new("symbol").long("symbol").required(true))
                        .arg(
                            Arg::new("position")
                                .long("position")
                                .default_value("before")
                                .help("before | after"),
                        ),
                ),
        )
}

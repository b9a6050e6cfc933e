// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
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

fn name_arg() -> Arg {
    Arg::new("name").long("name").required(true)
}

fn rename_arg() -> Arg {
    Arg::new("rename").long("rename").help("New name")
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("date").long("date").required(required).help("YYYY-MM-DD"))
        .arg(Arg::new("category").long("category").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(Arg::new("note").long("note"))
        .arg(
            Arg::new("kind")
                .long("kind")
                .value_parser(["plain", "claim", "withdrawal"])
                .help("claim: lend against a receivable debt; withdrawal: take money out of a goal"),
        )
}

pub fn build_cli() -> Command {
    Command::new("koinfo")
        .about("Cycle-based personal finance ledger")
        .version(clap::crate_version!())
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Evaluate as if today were this date (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("anchor-day")
                .long("anchor-day")
                .global(true)
                .value_parser(clap::value_parser!(u32))
                .help("Override the configured cycle anchor day (1-31)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-anchor-day").arg(
                        Arg::new("day")
                            .long("day")
                            .required(true)
                            .value_parser(clap::value_parser!(u32)),
                    ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add").arg(name_arg()).arg(
                        Arg::new("type")
                            .long("type")
                            .default_value("expense")
                            .value_parser(["income", "expense", "saving"]),
                    ),
                )
                .subcommand(
                    Command::new("edit").arg(name_arg()).arg(rename_arg()).arg(
                        Arg::new("type")
                            .long("type")
                            .value_parser(["income", "expense", "saving"]),
                    ),
                )
                .subcommand(json_args(Command::new("list")).arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include deleted categories"),
                ))
                .subcommand(Command::new("rm").arg(name_arg())),
        )
        .subcommand(
            Command::new("debt")
                .about("Manage debts")
                .subcommand(
                    Command::new("add")
                        .arg(name_arg())
                        .arg(Arg::new("balance").long("balance").default_value("0"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .default_value("payable")
                                .value_parser(["payable", "receivable"]),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(name_arg())
                        .arg(rename_arg())
                        .arg(Arg::new("balance").long("balance"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["payable", "receivable"]),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(name_arg())),
        )
        .subcommand(
            Command::new("goal")
                .about("Manage savings goals")
                .subcommand(
                    Command::new("add")
                        .arg(name_arg())
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(
                            Arg::new("deadline")
                                .long("deadline")
                                .required(true)
                                .help("YYYY-MM-DD, after today"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(name_arg())
                        .arg(rename_arg())
                        .arg(Arg::new("target").long("target"))
                        .arg(
                            Arg::new("deadline")
                                .long("deadline")
                                .help("YYYY-MM-DD, after today"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(name_arg())),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(tx_fields(Command::new("add"), true).arg(
                    Arg::new("use-open-balance")
                        .long("use-open-balance")
                        .action(ArgAction::SetTrue),
                ))
                .subcommand(
                    tx_fields(Command::new("edit"), false)
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(
                            Arg::new("use-open-balance")
                                .long("use-open-balance")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("no-open-balance")
                                .long("no-open-balance")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("use-open-balance"),
                        ),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(
                    json_args(Command::new("list"))
                        .arg(
                            Arg::new("cycle")
                                .long("cycle")
                                .help("Only the cycle containing this date"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ),
        )
        .subcommand(
            Command::new("cycle")
                .about("Budget cycle summaries")
                .subcommand(
                    json_args(Command::new("show"))
                        .arg(Arg::new("date").long("date").help("Any date inside the cycle")),
                )
                .subcommand(json_args(Command::new("history")))
                .subcommand(json_args(Command::new("pace"))),
        )
        .subcommand(
            Command::new("open-balance")
                .about("Opening balance carried in from before the ledger")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set").arg(Arg::new("amount").long("amount").required(true)),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Import or export the whole dataset as JSON")
                .subcommand(Command::new("export").arg(Arg::new("out").long("out")))
                .subcommand(
                    Command::new("import").arg(Arg::new("file").long("file").required(true)),
                )
                .subcommand(Command::new("reset").arg(
                    Arg::new("yes").long("yes").action(ArgAction::SetTrue).required(true),
                )),
        )
        .subcommand(Command::new("doctor").about("Check the dataset for inconsistencies"))
}

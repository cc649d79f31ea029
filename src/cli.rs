// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .help("Print pretty JSON")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print one JSON object per line")
            .action(ArgAction::SetTrue),
    )
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn budget_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(
            Arg::new("category")
                .long("category")
                .required(required)
                .help("housing, transportation, food, utilities, healthcare, entertainment, shopping, savings, debt, other"),
        )
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(
            Arg::new("period")
                .long("period")
                .required(required)
                .help("daily, weekly, monthly, yearly"),
        )
        .arg(Arg::new("end").long("end").help("End date YYYY-MM-DD"))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Budgets, expenses and spending reports")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list").about("List budgets").arg(
                Arg::new("category")
                    .long("category")
                    .help("Only budgets in this category"),
            ),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one budget")
                .arg(id_arg("id", "Budget id")),
        ))
        .subcommand(
            budget_fields(Command::new("create").about("Create a budget"), true).arg(
                Arg::new("start")
                    .long("start")
                    .required(true)
                    .help("Start date YYYY-MM-DD"),
            ),
        )
        .subcommand(budget_fields(
            Command::new("update")
                .about("Update fields of a budget")
                .arg(id_arg("id", "Budget id")),
            false,
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a budget")
                .arg(id_arg("id", "Budget id")),
        )
        .subcommand(
            Command::new("expense")
                .about("Record an expense against a budget")
                .arg(id_arg("id", "Budget id"))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
                .arg(
                    Arg::new("transaction")
                        .long("transaction")
                        .help("Linked transaction id"),
                ),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Server-computed summary for one budget")
                .arg(id_arg("id", "Budget id")),
        ))
        .subcommand(json_flags(
            Command::new("categories")
                .about("Spending per category over a date range")
                .arg(
                    Arg::new("start")
                        .long("start")
                        .required(true)
                        .help("YYYY-MM-DD"),
                )
                .arg(Arg::new("end").long("end").required(true).help("YYYY-MM-DD")),
        ))
        .subcommand(json_flags(
            Command::new("dashboard")
                .about("Totals, category breakdown and active alerts")
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("all-categories")
                        .long("all-categories")
                        .help("Include categories without budgets")
                        .action(ArgAction::SetTrue),
                ),
        ))
}

fn alerts_cmd() -> Command {
    Command::new("alerts")
        .about("Budget alerts")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list").about("List active alerts by severity"),
        ))
        .subcommand(
            Command::new("dismiss")
                .about("Dismiss an alert")
                .arg(id_arg("id", "Alert id")),
        )
}

fn portfolio_cmd() -> Command {
    Command::new("portfolio")
        .about("Investment portfolios")
        .subcommand_required(true)
        .subcommand(json_flags(Command::new("list").about("List portfolios")))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show holdings of a portfolio")
                .arg(id_arg("id", "Portfolio id")),
        ))
        .subcommand(
            Command::new("create")
                .about("Create a portfolio")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("update")
                .about("Rename or describe a portfolio")
                .arg(id_arg("id", "Portfolio id"))
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("trade")
                .about("Record a transaction")
                .arg(id_arg("id", "Portfolio id"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("buy, sell, dividend, interest, deposit, withdrawal"),
                )
                .arg(Arg::new("symbol").long("symbol").required(true))
                .arg(
                    Arg::new("asset-type")
                        .long("asset-type")
                        .default_value("stock")
                        .help("stock, bond, etf, mutual_fund, crypto, real_estate, commodity, cash"),
                )
                .arg(Arg::new("quantity").long("quantity").required(true))
                .arg(Arg::new("price").long("price").required(true))
                .arg(Arg::new("fees").long("fees"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("update-prices")
                .about("Refresh market prices")
                .arg(id_arg("id", "Portfolio id")),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Server-computed portfolio summary")
                .arg(id_arg("id", "Portfolio id")),
        ))
        .subcommand(json_flags(
            Command::new("performance")
                .about("Value over time")
                .arg(id_arg("id", "Portfolio id"))
                .arg(
                    Arg::new("timeframe")
                        .long("timeframe")
                        .default_value("1Y")
                        .help("1M, 3M, 6M or 1Y"),
                ),
        ))
        .subcommand(
            Command::new("alert")
                .about("Create a price or portfolio alert")
                .arg(id_arg("id", "Portfolio id"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("price_target, price_change, portfolio_change"),
                )
                .arg(Arg::new("threshold").long("threshold").required(true))
                .arg(Arg::new("message").long("message").required(true))
                .arg(Arg::new("holding").long("holding").help("Holding id")),
        )
        .subcommand(json_flags(
            Command::new("dashboard")
                .about("Fleet totals, allocation and recent transactions")
                .arg(
                    Arg::new("select")
                        .long("select")
                        .help("Portfolio id to chart performance for"),
                )
                .arg(
                    Arg::new("timeframe")
                        .long("timeframe")
                        .default_value("1Y")
                        .help("1M, 3M, 6M or 1Y"),
                ),
        ))
}

fn export_cmd() -> Command {
    let target = |name: &'static str, about: &'static str| {
        Command::new(name)
            .about(about)
            .arg(
                Arg::new("format")
                    .long("format")
                    .default_value("csv")
                    .help("csv or json"),
            )
            .arg(Arg::new("out").long("out").required(true))
    };
    Command::new("export")
        .about("Export data to CSV or JSON")
        .subcommand_required(true)
        .subcommand(target(
            "transactions",
            "Recent investment transactions across portfolios",
        ))
        .subcommand(target("categories", "Budget breakdown per category"))
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Inspect configuration")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("show").about("Effective configuration, token redacted"),
        ))
        .subcommand(Command::new("path").about("Location of the config file"))
}

pub fn build_cli() -> Command {
    command!()
        .about("Finboard: budget and investment dashboards for the terminal")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL, e.g. http://localhost:8000/api/v1"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("Bearer token"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log requests to stderr"),
        )
        .subcommand(budget_cmd())
        .subcommand(alerts_cmd())
        .subcommand(portfolio_cmd())
        .subcommand(export_cmd())
        .subcommand(config_cmd())
}

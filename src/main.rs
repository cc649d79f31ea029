// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use finboard::api::HttpApi;
use finboard::cache::QueryCache;
use finboard::config::Config;
use finboard::logging::{LoggingConfig, init_logging};
use finboard::query::QueryClient;
use finboard::{cli, commands};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let cfg = Config::load()?
        .with_overrides(
            matches.get_one::<String>("api-url").map(String::as_str),
            matches.get_one::<String>("token").map(String::as_str),
        );
    init_logging(&LoggingConfig::from_config(&cfg, matches.get_flag("verbose")))?;
    debug!(config = ?cfg.redacted(), "configuration loaded");

    if let Some(("config", sub)) = matches.subcommand() {
        return commands::config_cmd::handle(&cfg, sub);
    }
    let cfg = cfg.validate()?;

    let api = HttpApi::from_config(&cfg)?;
    let client = QueryClient::new(Arc::new(api), QueryCache::new(), cfg.stale_after());

    match matches.subcommand() {
        Some(("budget", sub)) => commands::budgets::handle(&client, sub).await?,
        Some(("alerts", sub)) => commands::alerts::handle(&client, sub).await?,
        Some(("portfolio", sub)) => commands::portfolio::handle(&client, sub).await?,
        Some(("export", sub)) => commands::exporter::handle(&client, sub).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

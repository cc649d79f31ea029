// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Adds target and span fields; for `-v` runs.
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn from_config(cfg: &Config, verbose: bool) -> Self {
        let log_level = if verbose && cfg.log_level == Config::default().log_level {
            "finboard=debug".to_string()
        } else {
            cfg.log_level.clone()
        };
        Self { log_level, verbose }
    }

    pub fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| anyhow!("Invalid log filter '{}': {}", self.log_level, e))
    }
}

/// Installs the global subscriber. Output goes to stderr so tables and JSON on
/// stdout stay clean.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.verbose);
    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(fmt)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;

use crate::config::{Config, config_path};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(cfg: &Config, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(cfg, sub)?,
        Some(("path", _)) => println!("{}", config_path()?.display()),
        _ => {}
    }
    Ok(())
}

fn show(cfg: &Config, sub: &ArgMatches) -> Result<()> {
    let safe = cfg.redacted();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &safe)? {
        let rows = vec![
            vec!["api_url".to_string(), safe.api_url.clone()],
            vec!["token".to_string(), safe.token.clone().unwrap_or_else(|| "(none)".into())],
            vec!["timeout_secs".to_string(), safe.timeout_secs.to_string()],
            vec!["stale_after_secs".to_string(), safe.stale_after_secs.to_string()],
            vec!["log_level".to_string(), safe.log_level.clone()],
        ];
        println!("{}", pretty_table(&["Key", "Value"], rows));
    }
    Ok(())
}

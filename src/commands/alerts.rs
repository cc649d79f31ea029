// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::query::QueryClient;
use crate::utils::{maybe_print_json, parse_id};
use crate::views::AlertsPanel;

pub async fn handle(client: &QueryClient, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub).await?,
        Some(("dismiss", sub)) => dismiss(client, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn list(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let mut panel = AlertsPanel::new();
    panel.load(client).await;
    if let Some(err) = panel.state().error() {
        return Err(err.clone()).context("Failed to load alerts");
    }
    let alerts = panel.state().data().cloned().unwrap_or_default();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &alerts)? {
        println!("{}", panel.render());
    }
    Ok(())
}

/// Dismisses on the server, then shows what is still active.
async fn dismiss(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let mut panel = AlertsPanel::new();
    panel.load(client).await;
    panel
        .dismiss(client, id)
        .await
        .with_context(|| format!("Failed to dismiss alert {}", id))?;
    println!("Dismissed alert #{}", id);
    panel.refresh_if_outdated(client).await;
    if panel.state().error().is_none() {
        println!("{}", panel.render());
    }
    Ok(())
}

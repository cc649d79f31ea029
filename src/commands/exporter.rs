// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use serde_json::json;

use crate::aggregate::budget::category_breakdown;
use crate::aggregate::portfolio::recent_transactions;
use crate::query::QueryClient;
use crate::utils::{fmt_date, required};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn parse_format(sub: &ArgMatches) -> Result<Format> {
    let raw = required(sub, "format")?.trim().to_lowercase();
    match raw.as_str() {
        "csv" => Ok(Format::Csv),
        "json" => Ok(Format::Json),
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
}

pub async fn handle(client: &QueryClient, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(client, sub).await,
        Some(("categories", sub)) => export_categories(client, sub).await,
        _ => Ok(()),
    }
}

/// Every transaction across portfolios, newest first.
async fn export_transactions(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let fmt = parse_format(sub)?;
    let out = required(sub, "out")?;
    let portfolios = client
        .portfolios()
        .await
        .context("Failed to load portfolios")?;
    let rows = recent_transactions(&portfolios, usize::MAX);

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Cannot create {}", out))?;
            wtr.write_record([
                "date", "portfolio", "type", "symbol", "quantity", "price", "total", "fees",
                "notes",
            ])?;
            for r in &rows {
                let t = &r.transaction;
                wtr.write_record([
                    fmt_date(&t.date),
                    r.portfolio_name.clone(),
                    t.transaction_type.to_string(),
                    t.symbol.clone(),
                    t.quantity.to_string(),
                    t.price.to_string(),
                    t.total_amount.to_string(),
                    t.fees.to_string(),
                    t.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    let t = &r.transaction;
                    json!({
                        "date": fmt_date(&t.date),
                        "portfolio": r.portfolio_name,
                        "type": t.transaction_type,
                        "symbol": t.symbol,
                        "quantity": t.quantity.to_string(),
                        "price": t.price.to_string(),
                        "total": t.total_amount.to_string(),
                        "fees": t.fees.to_string(),
                        "notes": t.notes,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Cannot write {}", out))?;
        }
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

/// Per-category budget breakdown; categories without budgets are left out.
async fn export_categories(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let fmt = parse_format(sub)?;
    let out = required(sub, "out")?;
    let budgets = client.budgets().await.context("Failed to load budgets")?;
    let rows: Vec<_> = category_breakdown(&budgets)
        .into_iter()
        .filter(|r| r.budget_count > 0)
        .collect();

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Cannot create {}", out))?;
            wtr.write_record(["category", "budgets", "amount", "spent", "percentage", "status"])?;
            for r in &rows {
                wtr.write_record([
                    r.category.to_string(),
                    r.budget_count.to_string(),
                    r.amount.to_string(),
                    r.spent.to_string(),
                    r.percentage.round_dp(2).to_string(),
                    r.level.label().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Cannot write {}", out))?;
        }
    }
    println!("Exported {} categories to {}", rows.len(), out);
    Ok(())
}

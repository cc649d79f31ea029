// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use comfy_table::Cell;
use rust_decimal::Decimal;

use crate::aggregate::portfolio::portfolio_totals;
use crate::format::{format_currency, format_percent_value, format_signed_currency};
use crate::models::{
    AssetType, Portfolio, PortfolioAlertCreate, PortfolioAlertType, PortfolioCreate, Timeframe,
    TransactionCreate, TransactionType,
};
use crate::query::QueryClient;
use crate::utils::{
    gain_cell, maybe_print_json, optional, parse_datetime, parse_decimal, parse_id, required,
    styled_table,
};
use crate::views::InvestmentDashboard;
use crate::views::investment_dashboard::performance_table;

pub async fn handle(client: &QueryClient, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub).await?,
        Some(("show", sub)) => show(client, sub).await?,
        Some(("create", sub)) => create(client, sub).await?,
        Some(("update", sub)) => update(client, sub).await?,
        Some(("trade", sub)) => trade(client, sub).await?,
        Some(("update-prices", sub)) => update_prices(client, sub).await?,
        Some(("summary", sub)) => summary(client, sub).await?,
        Some(("performance", sub)) => performance(client, sub).await?,
        Some(("alert", sub)) => alert(client, sub).await?,
        Some(("dashboard", sub)) => dashboard(client, sub).await?,
        _ => {}
    }
    Ok(())
}

fn parse_timeframe(sub: &ArgMatches) -> Result<Timeframe> {
    match optional(sub, "timeframe") {
        Some(raw) => raw.parse::<Timeframe>().map_err(|e| anyhow!(e)),
        None => Ok(Timeframe::default()),
    }
}

async fn list(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let portfolios = client
        .portfolios()
        .await
        .context("Failed to load portfolios")?;
    let totals: Vec<_> = portfolios.iter().map(portfolio_totals).collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        if totals.is_empty() {
            println!("No portfolios yet");
            return Ok(());
        }
        let rows = totals
            .iter()
            .map(|t| {
                vec![
                    Cell::new(t.portfolio_id),
                    Cell::new(&t.name),
                    Cell::new(t.holding_count),
                    Cell::new(format_currency(t.total_value)),
                    gain_cell(format_signed_currency(t.total_gain_loss), t.total_gain_loss),
                ]
            })
            .collect();
        println!(
            "{}",
            styled_table(&["ID", "Name", "Holdings", "Value", "Gain/Loss"], rows)
        );
    }
    Ok(())
}

fn holdings_table(p: &Portfolio) -> String {
    let rows = p
        .holdings
        .iter()
        .map(|h| {
            vec![
                Cell::new(&h.symbol),
                Cell::new(h.asset_type.as_str()),
                Cell::new(h.quantity),
                Cell::new(format_currency(h.average_price)),
                Cell::new(format_currency(h.effective_price())),
                Cell::new(format_currency(h.market_value)),
                gain_cell(format_signed_currency(h.gain_loss), h.gain_loss),
                gain_cell(
                    format_percent_value(Some(h.gain_loss_percentage)),
                    h.gain_loss_percentage,
                ),
            ]
        })
        .collect();
    styled_table(
        &["Symbol", "Type", "Qty", "Avg price", "Price", "Value", "Gain/Loss", "%"],
        rows,
    )
    .to_string()
}

async fn show(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let p = client
        .portfolio(id)
        .await
        .with_context(|| format!("Failed to load portfolio {}", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        println!("#{} {}", p.id, p.name);
        if let Some(d) = &p.description {
            println!("{}", d);
        }
        if p.holdings.is_empty() {
            println!("No holdings");
        } else {
            println!("{}", holdings_table(&p));
        }
    }
    Ok(())
}

fn portfolio_body(sub: &ArgMatches) -> Result<PortfolioCreate> {
    Ok(PortfolioCreate {
        name: required(sub, "name")?.trim().to_string(),
        description: optional(sub, "description"),
    })
}

async fn create(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let body = portfolio_body(sub)?;
    let p = client
        .create_portfolio(&body)
        .await
        .context("Failed to create portfolio")?;
    println!("Created portfolio #{} {}", p.id, p.name);
    Ok(())
}

async fn update(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let body = portfolio_body(sub)?;
    let p = client
        .update_portfolio(id, &body)
        .await
        .with_context(|| format!("Failed to update portfolio {}", id))?;
    println!("Updated portfolio #{} {}", p.id, p.name);
    Ok(())
}

async fn trade(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let transaction_type = required(sub, "type")?
        .parse::<TransactionType>()
        .map_err(|e| anyhow!(e))?;
    let asset_type = required(sub, "asset-type")?
        .parse::<AssetType>()
        .map_err(|e| anyhow!(e))?;
    let fees = match optional(sub, "fees") {
        Some(raw) => parse_decimal(&raw)?,
        None => Decimal::ZERO,
    };
    let body = TransactionCreate {
        transaction_type,
        symbol: required(sub, "symbol")?.trim().to_uppercase(),
        asset_type,
        quantity: parse_decimal(required(sub, "quantity")?)?.abs(),
        price: parse_decimal(required(sub, "price")?)?,
        fees,
        date: optional(sub, "date").map(|s| parse_datetime(&s)).transpose()?,
        notes: optional(sub, "notes"),
    };
    let tx = client
        .add_transaction(id, &body)
        .await
        .with_context(|| format!("Failed to record transaction on portfolio {}", id))?;
    println!(
        "Recorded {} {} x {} @ {} (fees {})",
        tx.transaction_type,
        tx.quantity,
        tx.symbol,
        format_currency(tx.price),
        format_currency(tx.fees)
    );
    Ok(())
}

async fn update_prices(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    client
        .update_prices(id)
        .await
        .with_context(|| format!("Failed to refresh prices for portfolio {}", id))?;
    println!("Prices refreshed for portfolio #{}", id);
    Ok(())
}

async fn summary(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let s = client
        .portfolio_summary(id)
        .await
        .with_context(|| format!("Failed to load summary for portfolio {}", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!(
            "{}",
            styled_table(
                &["Value", "Gain/Loss", "Return"],
                vec![vec![
                    Cell::new(format_currency(s.total_value)),
                    gain_cell(format_signed_currency(s.total_gain_loss), s.total_gain_loss),
                    gain_cell(
                        format_percent_value(Some(s.gain_loss_percentage)),
                        s.gain_loss_percentage,
                    ),
                ]],
            )
        );
        if !s.allocation.is_empty() {
            let rows = s
                .allocation
                .iter()
                .map(|(asset, value)| {
                    vec![
                        Cell::new(asset.as_str()),
                        Cell::new(format_currency(*value)),
                    ]
                })
                .collect();
            println!("{}", styled_table(&["Asset type", "Value"], rows));
        }
    }
    Ok(())
}

async fn performance(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let timeframe = parse_timeframe(sub)?;
    let points = client
        .performance(id, timeframe)
        .await
        .with_context(|| format!("Failed to load performance for portfolio {}", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        println!("{}", performance_table(&points));
    }
    Ok(())
}

async fn alert(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let holding_id = optional(sub, "holding")
        .map(|h| {
            h.parse::<i64>()
                .with_context(|| format!("Invalid holding id '{}'", h))
        })
        .transpose()?;
    let body = PortfolioAlertCreate {
        holding_id,
        alert_type: required(sub, "type")?
            .parse::<PortfolioAlertType>()
            .map_err(|e| anyhow!(e))?,
        threshold: parse_decimal(required(sub, "threshold")?)?,
        message: required(sub, "message")?.trim().to_string(),
    };
    let a = client
        .create_portfolio_alert(id, &body)
        .await
        .with_context(|| format!("Failed to create alert on portfolio {}", id))?;
    println!("Created {} alert #{} at {}", a.alert_type, a.id, a.threshold);
    Ok(())
}

async fn dashboard(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let mut view = InvestmentDashboard::new();
    view.select_timeframe(parse_timeframe(sub)?);
    if let Some(raw) = optional(sub, "select") {
        let id = raw
            .parse::<i64>()
            .with_context(|| format!("Invalid portfolio id '{}'", raw))?;
        view.select_portfolio(Some(id));
    }
    view.load(client).await;

    if let Some(err) = view.portfolios().error() {
        return Err(err.clone()).context("Failed to load portfolios");
    }
    let (json_flag, jsonl_flag) = (sub.get_flag("json"), sub.get_flag("jsonl"));
    if json_flag || jsonl_flag {
        if let Some(overview) = view.overview() {
            maybe_print_json(json_flag, jsonl_flag, &overview)?;
        }
        return Ok(());
    }
    println!("{}", view.render());
    Ok(())
}

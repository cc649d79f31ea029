// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use comfy_table::Cell;

use crate::format::{format_currency, format_percent_value};
use crate::models::{BudgetCategory, BudgetCreate, BudgetPeriod, BudgetUpdate, ExpenseCreate};
use crate::query::QueryClient;
use crate::utils::{
    maybe_print_json, optional, parse_datetime, parse_decimal, parse_id, required, styled_table,
    usage_cell,
};
use crate::aggregate::budget::UsageLevel;
use crate::views::BudgetDashboard;
use crate::views::budget_dashboard::budgets_table;

pub async fn handle(client: &QueryClient, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub).await?,
        Some(("show", sub)) => show(client, sub).await?,
        Some(("create", sub)) => create(client, sub).await?,
        Some(("update", sub)) => update(client, sub).await?,
        Some(("delete", sub)) => delete(client, sub).await?,
        Some(("expense", sub)) => expense(client, sub).await?,
        Some(("summary", sub)) => summary(client, sub).await?,
        Some(("categories", sub)) => categories(client, sub).await?,
        Some(("dashboard", sub)) => dashboard(client, sub).await?,
        _ => {}
    }
    Ok(())
}

fn parse_category(raw: &str) -> Result<BudgetCategory> {
    raw.parse::<BudgetCategory>().map_err(|e| anyhow!(e))
}

fn parse_period(raw: &str) -> Result<BudgetPeriod> {
    raw.parse::<BudgetPeriod>().map_err(|e| anyhow!(e))
}

async fn list(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let filter = optional(sub, "category")
        .map(|c| parse_category(&c))
        .transpose()?;
    let mut budgets = client.budgets().await.context("Failed to load budgets")?;
    if let Some(cat) = filter {
        budgets.retain(|b| b.category == cat);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        if budgets.is_empty() {
            println!("No budgets yet");
        } else {
            println!("{}", budgets_table(&budgets));
        }
    }
    Ok(())
}

async fn show(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let budget = client
        .budget(id)
        .await
        .with_context(|| format!("Failed to load budget {}", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budget)? {
        println!("{}", budgets_table(std::slice::from_ref(&budget)));
    }
    Ok(())
}

async fn create(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let body = BudgetCreate {
        name: required(sub, "name")?.trim().to_string(),
        category: parse_category(required(sub, "category")?)?,
        amount: parse_decimal(required(sub, "amount")?)?,
        period: parse_period(required(sub, "period")?)?,
        start_date: parse_datetime(required(sub, "start")?)?,
        end_date: optional(sub, "end").map(|s| parse_datetime(&s)).transpose()?,
    };
    let created = client
        .create_budget(&body)
        .await
        .context("Failed to create budget")?;
    println!(
        "Created budget #{} {} ({}, {} {})",
        created.id,
        created.name,
        created.category,
        format_currency(created.amount),
        created.period
    );
    Ok(())
}

async fn update(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let body = BudgetUpdate {
        name: optional(sub, "name"),
        category: optional(sub, "category")
            .map(|c| parse_category(&c))
            .transpose()?,
        amount: optional(sub, "amount")
            .map(|a| parse_decimal(&a))
            .transpose()?,
        period: optional(sub, "period")
            .map(|p| parse_period(&p))
            .transpose()?,
        end_date: optional(sub, "end").map(|s| parse_datetime(&s)).transpose()?,
    };
    if body.is_empty() {
        bail!("Nothing to update: pass at least one of --name, --category, --amount, --period, --end");
    }
    let updated = client
        .update_budget(id, &body)
        .await
        .with_context(|| format!("Failed to update budget {}", id))?;
    println!("Updated budget #{} {}", updated.id, updated.name);
    Ok(())
}

async fn delete(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    client
        .delete_budget(id)
        .await
        .with_context(|| format!("Failed to delete budget {}", id))?;
    println!("Deleted budget #{}", id);
    Ok(())
}

async fn expense(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let transaction_id = optional(sub, "transaction")
        .map(|t| {
            t.parse::<i64>()
                .with_context(|| format!("Invalid transaction id '{}'", t))
        })
        .transpose()?;
    let body = ExpenseCreate {
        amount: parse_decimal(required(sub, "amount")?)?,
        transaction_id,
        description: optional(sub, "description"),
        date: optional(sub, "date").map(|s| parse_datetime(&s)).transpose()?,
    };
    let e = client
        .add_expense(id, &body)
        .await
        .with_context(|| format!("Failed to record expense on budget {}", id))?;
    println!(
        "Recorded expense #{} of {} on budget #{}",
        e.id,
        format_currency(e.amount),
        e.budget_id
    );
    Ok(())
}

async fn summary(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let id = parse_id(sub, "id")?;
    let s = client
        .budget_summary(id)
        .await
        .with_context(|| format!("Failed to load summary for budget {}", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let level = UsageLevel::from_percentage(s.percentage_used);
        let row = vec![
            Cell::new(s.budget_id),
            Cell::new(s.category.as_str()),
            Cell::new(s.period.as_str()),
            Cell::new(format_currency(s.total_budget)),
            Cell::new(format_currency(s.total_spent)),
            Cell::new(format_currency(s.remaining)),
            usage_cell(format_percent_value(Some(s.percentage_used)), level),
        ];
        println!(
            "{}",
            styled_table(
                &["Budget", "Category", "Period", "Budgeted", "Spent", "Remaining", "Used"],
                vec![row],
            )
        );
    }
    Ok(())
}

async fn categories(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let start = parse_datetime(required(sub, "start")?)?;
    let end = parse_datetime(required(sub, "end")?)?;
    let report = client
        .category_spending(start, end)
        .await
        .context("Failed to load category spending")?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        if report.is_empty() {
            println!("No spending in range");
            return Ok(());
        }
        let rows = report
            .iter()
            .map(|(cat, s)| {
                let pct = crate::aggregate::percent_of(s.total_spent, s.budget_amount);
                vec![
                    Cell::new(cat.as_str()),
                    Cell::new(format_currency(s.budget_amount)),
                    Cell::new(format_currency(s.total_spent)),
                    usage_cell(
                        format_percent_value(Some(pct)),
                        UsageLevel::from_percentage(pct),
                    ),
                ]
            })
            .collect();
        println!(
            "{}",
            styled_table(&["Category", "Budgeted", "Spent", "Used"], rows)
        );
    }
    Ok(())
}

async fn dashboard(client: &QueryClient, sub: &ArgMatches) -> Result<()> {
    let mut view = BudgetDashboard::new();
    view.category_filter = optional(sub, "category")
        .map(|c| parse_category(&c))
        .transpose()?;
    view.show_empty_categories = sub.get_flag("all-categories");
    view.load(client).await;

    if let Some(err) = view.budgets().error() {
        return Err(err.clone()).context("Failed to load budgets");
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

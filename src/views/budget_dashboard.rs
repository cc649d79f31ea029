// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use comfy_table::Cell;
use serde::Serialize;
use tracing::warn;

use super::{AlertsPanel, Mount, placeholder};
use crate::aggregate::budget::{
    BudgetTotals, CategoryBreakdown, UsageLevel, budget_totals, budget_usage, category_breakdown,
};
use crate::error::ApiError;
use crate::format::{format_currency, format_percent_value};
use crate::models::{Budget, BudgetAlert, BudgetCategory};
use crate::query::{QueryClient, QueryState, guarded};
use crate::utils::{fmt_date, styled_table, usage_cell};

/// Everything the budget dashboard shows, in machine-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetOverview {
    pub totals: BudgetTotals,
    pub categories: Vec<CategoryBreakdown>,
    pub alerts: Vec<BudgetAlert>,
}

#[derive(Debug)]
pub struct BudgetDashboard {
    mount: Mount,
    budgets: QueryState<Vec<Budget>>,
    alerts: AlertsPanel,
    pub category_filter: Option<BudgetCategory>,
    pub show_empty_categories: bool,
}

impl Default for BudgetDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetDashboard {
    pub fn new() -> Self {
        let mount = Mount::new();
        let alerts = AlertsPanel::with_mount(mount.child());
        Self {
            mount,
            budgets: QueryState::Idle,
            alerts,
            category_filter: None,
            show_empty_categories: false,
        }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn budgets(&self) -> &QueryState<Vec<Budget>> {
        &self.budgets
    }

    pub fn alerts(&self) -> &AlertsPanel {
        &self.alerts
    }

    /// Loads budgets and alerts. Returns `false` if the dashboard unmounted mid-flight.
    pub async fn load(&mut self, client: &QueryClient) -> bool {
        if !self.mount.is_mounted() {
            return false;
        }
        self.budgets = QueryState::Loading;
        let token = self.mount.token().clone();
        let (budgets, alerts_applied) = tokio::join!(
            guarded(&token, client.budgets()),
            self.alerts.load(client)
        );
        match budgets {
            Some(result) => {
                self.budgets = QueryState::from_result(result);
                alerts_applied
            }
            None => {
                warn!("budgets response arrived after unmount; discarded");
                false
            }
        }
    }

    pub async fn dismiss_alert(&mut self, client: &QueryClient, id: i64) -> Result<(), ApiError> {
        self.alerts.dismiss(client, id).await
    }

    fn visible_budgets(&self) -> Vec<Budget> {
        let all = self.budgets.data().map(Vec::as_slice).unwrap_or_default();
        match self.category_filter {
            Some(c) => all.iter().filter(|b| b.category == c).cloned().collect(),
            None => all.to_vec(),
        }
    }

    pub fn totals(&self) -> Option<BudgetTotals> {
        self.budgets.data()?;
        Some(budget_totals(&self.visible_budgets()))
    }

    pub fn categories(&self) -> Vec<CategoryBreakdown> {
        category_breakdown(&self.visible_budgets())
            .into_iter()
            .filter(|row| self.show_empty_categories || row.budget_count > 0)
            .filter(|row| self.category_filter.is_none_or(|c| c == row.category))
            .collect()
    }

    pub fn overview(&self) -> Option<BudgetOverview> {
        Some(BudgetOverview {
            totals: self.totals()?,
            categories: self.categories(),
            alerts: self.alerts.state().data().cloned().unwrap_or_default(),
        })
    }

    pub fn render(&self) -> String {
        if let Some(text) = placeholder(&self.budgets, "Budgets") {
            return text;
        }
        let mut out = Vec::new();

        if let Some(t) = self.totals() {
            let rows = vec![vec![
                Cell::new(format_currency(t.total_budgeted)),
                Cell::new(format_currency(t.total_spent)),
                Cell::new(format_currency(t.total_remaining)),
                usage_cell(format_percent_value(Some(t.spent_percentage)), t.level),
            ]];
            out.push(
                styled_table(&["Budgeted", "Spent", "Remaining", "Used"], rows).to_string(),
            );
        }

        let cat_rows: Vec<Vec<Cell>> = self
            .categories()
            .into_iter()
            .map(|r| {
                vec![
                    Cell::new(r.category.as_str()),
                    Cell::new(r.budget_count),
                    Cell::new(format_currency(r.amount)),
                    Cell::new(format_currency(r.spent)),
                    usage_cell(format_percent_value(Some(r.percentage)), r.level),
                    usage_cell(r.level.label().to_string(), r.level),
                ]
            })
            .collect();
        if cat_rows.is_empty() {
            out.push("No budgets yet".to_string());
        } else {
            out.push(
                styled_table(
                    &["Category", "Budgets", "Amount", "Spent", "Used", "Status"],
                    cat_rows,
                )
                .to_string(),
            );
        }

        out.push(self.alerts.render());
        out.join("\n")
    }
}

/// Table of individual budgets with their own usage.
pub fn budgets_table(budgets: &[Budget]) -> String {
    let rows = budgets
        .iter()
        .map(|b| {
            let usage = budget_usage(b);
            let level = UsageLevel::from_percentage(usage);
            let spent = b.spent.unwrap_or_default();
            vec![
                Cell::new(b.id),
                Cell::new(&b.name),
                Cell::new(b.category.as_str()),
                Cell::new(b.period.as_str()),
                Cell::new(format_currency(b.amount)),
                Cell::new(format_currency(spent)),
                Cell::new(format_currency(b.remaining.unwrap_or(b.amount - spent))),
                usage_cell(format_percent_value(Some(usage)), level),
                Cell::new(fmt_date(&b.start_date)),
                Cell::new(b.end_date.as_ref().map(fmt_date).unwrap_or_default()),
            ]
        })
        .collect();
    styled_table(
        &[
            "ID", "Name", "Category", "Period", "Amount", "Spent", "Remaining", "Used", "Start",
            "End",
        ],
        rows,
    )
    .to_string()
}

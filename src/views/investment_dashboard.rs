// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use comfy_table::Cell;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Mount, placeholder};
use crate::aggregate::portfolio::{
    AllocationSlice, BestPerformer, FleetTotals, PortfolioTotals, RECENT_TRANSACTION_LIMIT,
    RecentTransaction, asset_allocation, best_performing, fleet_totals, portfolio_totals,
    recent_transactions,
};
use crate::format::{format_currency, format_percent_value, format_percentage, format_signed_currency};
use crate::models::{PerformancePoint, Portfolio, Timeframe};
use crate::query::{QueryClient, QueryState, guarded};
use crate::utils::{fmt_date, gain_cell, styled_table};

/// Everything the investment dashboard shows, in machine-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentOverview {
    pub fleet: FleetTotals,
    pub best: Option<BestPerformer>,
    pub per_portfolio: Vec<PortfolioTotals>,
    pub allocation: Vec<AllocationSlice>,
    pub recent: Vec<RecentTransaction>,
}

impl InvestmentOverview {
    pub fn from_portfolios(portfolios: &[Portfolio]) -> Self {
        Self {
            fleet: fleet_totals(portfolios),
            best: best_performing(portfolios),
            per_portfolio: portfolios.iter().map(portfolio_totals).collect(),
            allocation: asset_allocation(portfolios),
            recent: recent_transactions(portfolios, RECENT_TRANSACTION_LIMIT),
        }
    }
}

#[derive(Debug, Default)]
pub struct InvestmentDashboard {
    mount: Mount,
    portfolios: QueryState<Vec<Portfolio>>,
    performance: QueryState<Vec<PerformancePoint>>,
    pub timeframe: Timeframe,
    pub selected_portfolio: Option<i64>,
}

impl InvestmentDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn portfolios(&self) -> &QueryState<Vec<Portfolio>> {
        &self.portfolios
    }

    pub fn performance(&self) -> &QueryState<Vec<PerformancePoint>> {
        &self.performance
    }

    /// Changing the timeframe drops the series loaded for the old one.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        if self.timeframe != timeframe {
            self.timeframe = timeframe;
            self.performance = QueryState::Idle;
        }
    }

    pub fn select_portfolio(&mut self, id: Option<i64>) {
        if self.selected_portfolio != id {
            self.selected_portfolio = id;
            self.performance = QueryState::Idle;
        }
    }

    /// Loads portfolios, then the performance series of the selected portfolio.
    /// Returns `false` if a response was discarded because the view unmounted.
    pub async fn load(&mut self, client: &QueryClient) -> bool {
        if !self.mount.is_mounted() {
            return false;
        }
        let token = self.mount.token().clone();

        self.portfolios = QueryState::Loading;
        match guarded(&token, client.portfolios()).await {
            Some(result) => self.portfolios = QueryState::from_result(result),
            None => {
                warn!("portfolios response arrived after unmount; discarded");
                return false;
            }
        }

        let Some(id) = self.selected_portfolio else {
            return true;
        };
        debug!(portfolio_id = id, timeframe = %self.timeframe, "loading performance");
        self.performance = QueryState::Loading;
        match guarded(&token, client.performance(id, self.timeframe)).await {
            Some(result) => {
                self.performance = QueryState::from_result(result);
                true
            }
            None => {
                warn!(portfolio_id = id, "performance response arrived after unmount; discarded");
                false
            }
        }
    }

    pub fn overview(&self) -> Option<InvestmentOverview> {
        self.portfolios
            .data()
            .map(|p| InvestmentOverview::from_portfolios(p))
    }

    pub fn render(&self) -> String {
        if let Some(text) = placeholder(&self.portfolios, "Portfolios") {
            return text;
        }
        let Some(ov) = self.overview() else {
            return String::new();
        };
        let mut out = Vec::new();

        let best = ov
            .best
            .as_ref()
            .map(|b| {
                format!(
                    "{} ({})",
                    b.name,
                    format_percent_value(Some(b.average_gain_loss_percentage))
                )
            })
            .unwrap_or_else(|| "N/A".to_string());
        out.push(
            styled_table(
                &["Total value", "Gain/Loss", "Return", "Best performer"],
                vec![vec![
                    Cell::new(format_currency(ov.fleet.total_value)),
                    gain_cell(
                        format_signed_currency(ov.fleet.total_gain_loss),
                        ov.fleet.total_gain_loss,
                    ),
                    Cell::new(format_percentage(ov.fleet.overall_return)),
                    Cell::new(best),
                ]],
            )
            .to_string(),
        );

        if ov.per_portfolio.is_empty() {
            out.push("No portfolios yet".to_string());
            return out.join("\n");
        }

        let rows = ov
            .per_portfolio
            .iter()
            .map(|p| {
                let marker = if self.selected_portfolio == Some(p.portfolio_id) {
                    "*"
                } else {
                    ""
                };
                vec![
                    Cell::new(format!("{}{}", marker, p.portfolio_id)),
                    Cell::new(&p.name),
                    Cell::new(p.holding_count),
                    Cell::new(format_currency(p.total_value)),
                    gain_cell(format_signed_currency(p.total_gain_loss), p.total_gain_loss),
                ]
            })
            .collect();
        out.push(styled_table(&["ID", "Portfolio", "Holdings", "Value", "Gain/Loss"], rows).to_string());

        if !ov.allocation.is_empty() {
            let rows = ov
                .allocation
                .iter()
                .map(|s| {
                    vec![
                        Cell::new(s.asset_type.as_str()),
                        Cell::new(s.holding_count),
                        Cell::new(format_currency(s.value)),
                        Cell::new(format_percent_value(Some(s.percentage))),
                    ]
                })
                .collect();
            out.push(styled_table(&["Asset type", "Holdings", "Value", "Share"], rows).to_string());
        }

        if !ov.recent.is_empty() {
            out.push(transactions_table(&ov.recent));
        }

        if let Some(text) = self.render_performance() {
            out.push(text);
        }
        out.join("\n")
    }

    fn render_performance(&self) -> Option<String> {
        self.selected_portfolio?;
        let title = format!("Performance {}", self.timeframe);
        if let Some(text) = placeholder(&self.performance, &title) {
            return Some(text);
        }
        let points = self.performance.data()?;
        Some(performance_table(points))
    }
}

pub fn transactions_table(recent: &[RecentTransaction]) -> String {
    let rows = recent
        .iter()
        .map(|r| {
            let t = &r.transaction;
            vec![
                Cell::new(fmt_date(&t.date)),
                Cell::new(&r.portfolio_name),
                Cell::new(t.transaction_type.as_str()),
                Cell::new(&t.symbol),
                Cell::new(t.quantity),
                Cell::new(format_currency(t.price)),
                Cell::new(format_currency(t.total_amount)),
            ]
        })
        .collect();
    styled_table(
        &["Date", "Portfolio", "Type", "Symbol", "Qty", "Price", "Total"],
        rows,
    )
    .to_string()
}

pub fn performance_table(points: &[PerformancePoint]) -> String {
    if points.is_empty() {
        return "No performance data".to_string();
    }
    let rows = points
        .iter()
        .map(|p| {
            vec![
                Cell::new(fmt_date(&p.date)),
                Cell::new(format_currency(p.total_value)),
                Cell::new(format_percent_value(p.daily_return)),
                Cell::new(format_percent_value(p.total_return)),
            ]
        })
        .collect();
    styled_table(&["Date", "Value", "Daily", "Total"], rows).to_string()
}

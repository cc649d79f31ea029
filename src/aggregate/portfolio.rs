// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::percent_of;
use crate::models::{AssetType, Portfolio, Transaction};

pub const RECENT_TRANSACTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub portfolio_id: i64,
    pub name: String,
    pub holding_count: usize,
    pub total_value: Decimal,
    pub total_gain_loss: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetTotals {
    pub total_value: Decimal,
    pub total_gain_loss: Decimal,
    /// Gain/loss over reconstructed cost basis. `None` when the basis is not positive.
    pub overall_return: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPerformer {
    pub portfolio_id: i64,
    pub name: String,
    /// Mean of holding gain/loss percentages, in percent points.
    pub average_gain_loss_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub asset_type: AssetType,
    pub holding_count: usize,
    pub value: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub portfolio_id: i64,
    pub portfolio_name: String,
    #[serde(flatten)]
    pub transaction: Transaction,
}

pub fn portfolio_totals(p: &Portfolio) -> PortfolioTotals {
    PortfolioTotals {
        portfolio_id: p.id,
        name: p.name.clone(),
        holding_count: p.holdings.len(),
        total_value: p.holdings.iter().map(|h| h.market_value).sum(),
        total_gain_loss: p.holdings.iter().map(|h| h.gain_loss).sum(),
    }
}

pub fn fleet_totals(portfolios: &[Portfolio]) -> FleetTotals {
    let holdings = portfolios.iter().flat_map(|p| p.holdings.iter());
    let (total_value, total_gain_loss) = holdings.fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(v, g), h| (v + h.market_value, g + h.gain_loss),
    );
    FleetTotals {
        total_value,
        total_gain_loss,
        overall_return: overall_return(total_value, total_gain_loss),
    }
}

/// `gain_loss / (value - gain_loss)`; undefined when the implied cost basis is <= 0.
pub fn overall_return(total_value: Decimal, total_gain_loss: Decimal) -> Option<Decimal> {
    let cost_basis = total_value.checked_sub(total_gain_loss)?;
    if cost_basis <= Decimal::ZERO {
        return None;
    }
    total_gain_loss.checked_div(cost_basis)
}

fn mean_gain_loss_percentage(p: &Portfolio) -> Option<Decimal> {
    if p.holdings.is_empty() {
        return None;
    }
    let sum: Decimal = p.holdings.iter().map(|h| h.gain_loss_percentage).sum();
    sum.checked_div(Decimal::from(p.holdings.len()))
}

/// Highest mean holding return. Portfolios without holdings are skipped and ties keep
/// the earliest portfolio.
pub fn best_performing(portfolios: &[Portfolio]) -> Option<BestPerformer> {
    let mut best: Option<(&Portfolio, Decimal)> = None;
    for p in portfolios {
        let Some(mean) = mean_gain_loss_percentage(p) else {
            continue;
        };
        match best {
            Some((_, current)) if mean <= current => {}
            _ => best = Some((p, mean)),
        }
    }
    best.map(|(p, mean)| BestPerformer {
        portfolio_id: p.id,
        name: p.name.clone(),
        average_gain_loss_percentage: mean,
    })
}

/// Market value per asset type across every portfolio, largest first.
pub fn asset_allocation(portfolios: &[Portfolio]) -> Vec<AllocationSlice> {
    let mut values = [Decimal::ZERO; AssetType::COUNT];
    let mut counts = [0usize; AssetType::COUNT];
    for h in portfolios.iter().flat_map(|p| p.holdings.iter()) {
        let i = h.asset_type.index();
        values[i] += h.market_value;
        counts[i] += 1;
    }
    let grand_total: Decimal = values.iter().copied().sum();

    let mut slices: Vec<AllocationSlice> = AssetType::ALL
        .iter()
        .filter(|t| counts[t.index()] > 0)
        .map(|&asset_type| {
            let i = asset_type.index();
            AllocationSlice {
                asset_type,
                holding_count: counts[i],
                value: values[i],
                percentage: percent_of(values[i], grand_total),
            }
        })
        .collect();
    slices.sort_by(|a, b| b.value.cmp(&a.value));
    slices
}

/// Newest first, at most `limit`. Equal dates keep portfolio then list order.
pub fn recent_transactions(portfolios: &[Portfolio], limit: usize) -> Vec<RecentTransaction> {
    let mut all: Vec<RecentTransaction> = portfolios
        .iter()
        .flat_map(|p| {
            p.transactions.iter().map(move |t| RecentTransaction {
                portfolio_id: p.id,
                portfolio_name: p.name.clone(),
                transaction: t.clone(),
            })
        })
        .collect();
    // sort_by is stable
    all.sort_by(|a, b| b.transaction.date.cmp(&a.transaction.date));
    all.truncate(limit);
    all
}

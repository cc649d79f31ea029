// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::percent_of;
use crate::models::{Budget, BudgetCategory};

/// Usage above this many percent points is flagged critical.
pub const CRITICAL_USAGE_PCT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
/// The backend raises approaching-limit alerts from this usage on.
pub const APPROACHING_USAGE_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLevel {
    Healthy,
    Approaching,
    Critical,
}

impl UsageLevel {
    pub fn from_percentage(pct: Decimal) -> Self {
        if pct > CRITICAL_USAGE_PCT {
            UsageLevel::Critical
        } else if pct >= APPROACHING_USAGE_PCT {
            UsageLevel::Approaching
        } else {
            UsageLevel::Healthy
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UsageLevel::Healthy => "ok",
            UsageLevel::Approaching => "approaching",
            UsageLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetTotals {
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    /// Percent points, zero when nothing is budgeted.
    pub spent_percentage: Decimal,
    pub level: UsageLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: BudgetCategory,
    pub budget_count: usize,
    pub amount: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub level: UsageLevel,
}

fn spent_of(b: &Budget) -> Decimal {
    b.spent.unwrap_or(Decimal::ZERO)
}

pub fn budget_totals(budgets: &[Budget]) -> BudgetTotals {
    let total_budgeted: Decimal = budgets.iter().map(|b| b.amount).sum();
    let total_spent: Decimal = budgets.iter().map(spent_of).sum();
    let spent_percentage = percent_of(total_spent, total_budgeted);
    BudgetTotals {
        total_budgeted,
        total_spent,
        total_remaining: total_budgeted - total_spent,
        spent_percentage,
        level: UsageLevel::from_percentage(spent_percentage),
    }
}

/// One row per category, in declaration order, including empty categories.
pub fn category_breakdown(budgets: &[Budget]) -> Vec<CategoryBreakdown> {
    let mut amounts = [Decimal::ZERO; BudgetCategory::COUNT];
    let mut spent = [Decimal::ZERO; BudgetCategory::COUNT];
    let mut counts = [0usize; BudgetCategory::COUNT];
    for b in budgets {
        let i = b.category.index();
        amounts[i] += b.amount;
        spent[i] += spent_of(b);
        counts[i] += 1;
    }

    BudgetCategory::ALL
        .iter()
        .map(|&category| {
            let i = category.index();
            let percentage = percent_of(spent[i], amounts[i]);
            CategoryBreakdown {
                category,
                budget_count: counts[i],
                amount: amounts[i],
                spent: spent[i],
                percentage,
                level: UsageLevel::from_percentage(percentage),
            }
        })
        .collect()
}

/// Usage of a single budget, in percent points.
pub fn budget_usage(budget: &Budget) -> Decimal {
    percent_of(spent_of(budget), budget.amount)
}

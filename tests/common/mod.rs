// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::sync::Notify;

use finboard::api::Api;
use finboard::cache::QueryCache;
use finboard::error::ApiError;
use finboard::models::*;
use finboard::query::QueryClient;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn budget(id: i64, category: BudgetCategory, amount: &str, spent: Option<&str>) -> Budget {
    Budget {
        id,
        user_id: 1,
        name: format!("budget {}", id),
        category,
        amount: dec(amount),
        period: BudgetPeriod::Monthly,
        start_date: day(2024, 3, 1),
        end_date: None,
        spent: spent.map(dec),
        remaining: None,
        created_at: day(2024, 3, 1),
        updated_at: day(2024, 3, 1),
    }
}

pub fn alert(id: i64, alert_type: AlertType) -> BudgetAlert {
    BudgetAlert {
        id,
        budget_id: 1,
        alert_type,
        status: AlertStatus::Active,
        message: format!("alert {}", id),
        threshold_percentage: None,
        created_at: day(2024, 3, id as u32),
        updated_at: day(2024, 3, id as u32),
    }
}

pub fn holding(id: i64, symbol: &str, asset_type: AssetType, value: &str, gain: &str, pct: &str) -> Holding {
    Holding {
        id,
        symbol: symbol.to_string(),
        asset_type,
        quantity: Decimal::ONE,
        average_price: dec(value) - dec(gain),
        current_price: Some(dec(value)),
        market_value: dec(value),
        gain_loss: dec(gain),
        gain_loss_percentage: dec(pct),
    }
}

pub fn transaction(id: i64, symbol: &str, date: NaiveDateTime) -> Transaction {
    Transaction {
        id,
        symbol: symbol.to_string(),
        transaction_type: TransactionType::Buy,
        quantity: Decimal::ONE,
        price: dec("10"),
        total_amount: dec("10"),
        fees: Decimal::ZERO,
        date,
        notes: None,
    }
}

pub fn portfolio(id: i64, name: &str, holdings: Vec<Holding>, transactions: Vec<Transaction>) -> Portfolio {
    Portfolio {
        id,
        name: name.to_string(),
        description: None,
        holdings,
        transactions,
    }
}

#[derive(Default)]
pub struct MockState {
    pub budgets: Vec<Budget>,
    pub alerts: Vec<BudgetAlert>,
    pub portfolios: Vec<Portfolio>,
    pub performance: Vec<PerformancePoint>,
}

/// In-memory backend. Counts calls per endpoint; `gate` parks list calls until notified.
#[derive(Default)]
pub struct MockApi {
    pub state: Mutex<MockState>,
    calls: Mutex<HashMap<&'static str, usize>>,
    next_id: AtomicUsize,
    pub gate: Option<Arc<Notify>>,
}

impl MockApi {
    pub fn with_state(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
            next_id: AtomicUsize::new(100),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    fn hit(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) as i64
    }

    async fn wait_gate(&self) {
        if let Some(g) = &self.gate {
            g.notified().await;
        }
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl Api for MockApi {
    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.hit("list_budgets");
        self.wait_gate().await;
        Ok(self.state.lock().unwrap().budgets.clone())
    }

    async fn get_budget(&self, id: i64) -> Result<Budget, ApiError> {
        self.hit("get_budget");
        let s = self.state.lock().unwrap();
        s.budgets.iter().find(|b| b.id == id).cloned().ok_or_else(|| not_found("Budget"))
    }

    async fn create_budget(&self, body: &BudgetCreate) -> Result<Budget, ApiError> {
        self.hit("create_budget");
        let mut b = budget(self.next_id(), body.category, "0", None);
        b.name = body.name.clone();
        b.amount = body.amount;
        b.period = body.period;
        b.start_date = body.start_date;
        b.end_date = body.end_date;
        self.state.lock().unwrap().budgets.push(b.clone());
        Ok(b)
    }

    async fn update_budget(&self, id: i64, body: &BudgetUpdate) -> Result<Budget, ApiError> {
        self.hit("update_budget");
        let mut s = self.state.lock().unwrap();
        let b = s.budgets.iter_mut().find(|b| b.id == id).ok_or_else(|| not_found("Budget"))?;
        if let Some(n) = &body.name {
            b.name = n.clone();
        }
        if let Some(a) = body.amount {
            b.amount = a;
        }
        Ok(b.clone())
    }

    async fn delete_budget(&self, id: i64) -> Result<(), ApiError> {
        self.hit("delete_budget");
        let mut s = self.state.lock().unwrap();
        let before = s.budgets.len();
        s.budgets.retain(|b| b.id != id);
        if s.budgets.len() == before {
            return Err(not_found("Budget"));
        }
        Ok(())
    }

    async fn add_expense(&self, budget_id: i64, body: &ExpenseCreate) -> Result<BudgetExpense, ApiError> {
        self.hit("add_expense");
        let mut s = self.state.lock().unwrap();
        let b = s
            .budgets
            .iter_mut()
            .find(|b| b.id == budget_id)
            .ok_or_else(|| not_found("Budget"))?;
        b.spent = Some(b.spent.unwrap_or_default() + body.amount);
        Ok(BudgetExpense {
            id: self.next_id(),
            budget_id,
            transaction_id: body.transaction_id,
            amount: body.amount,
            description: body.description.clone(),
            date: body.date,
            created_at: day(2024, 3, 10),
        })
    }

    async fn budget_summary(&self, id: i64) -> Result<BudgetSummary, ApiError> {
        self.hit("budget_summary");
        let b = self.get_budget(id).await?;
        let spent = b.spent.unwrap_or_default();
        Ok(BudgetSummary {
            budget_id: b.id,
            total_budget: b.amount,
            total_spent: spent,
            remaining: b.amount - spent,
            percentage_used: Decimal::ZERO,
            period: b.period,
            category: b.category,
        })
    }

    async fn category_spending(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> Result<CategorySpendingReport, ApiError> {
        self.hit("category_spending");
        let s = self.state.lock().unwrap();
        let mut report = CategorySpendingReport::new();
        for b in &s.budgets {
            let e = report.entry(b.category).or_insert(CategorySpending {
                total_spent: Decimal::ZERO,
                budget_amount: Decimal::ZERO,
            });
            e.total_spent += b.spent.unwrap_or_default();
            e.budget_amount += b.amount;
        }
        Ok(report)
    }

    async fn list_alerts(&self) -> Result<Vec<BudgetAlert>, ApiError> {
        self.hit("list_alerts");
        Ok(self.state.lock().unwrap().alerts.clone())
    }

    async fn dismiss_alert(&self, id: i64) -> Result<(), ApiError> {
        self.hit("dismiss_alert");
        let mut s = self.state.lock().unwrap();
        let a = s.alerts.iter_mut().find(|a| a.id == id).ok_or_else(|| not_found("Alert"))?;
        a.status = AlertStatus::Dismissed;
        Ok(())
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, ApiError> {
        self.hit("list_portfolios");
        self.wait_gate().await;
        Ok(self.state.lock().unwrap().portfolios.clone())
    }

    async fn get_portfolio(&self, id: i64) -> Result<Portfolio, ApiError> {
        self.hit("get_portfolio");
        let s = self.state.lock().unwrap();
        s.portfolios.iter().find(|p| p.id == id).cloned().ok_or_else(|| not_found("Portfolio"))
    }

    async fn create_portfolio(&self, body: &PortfolioCreate) -> Result<Portfolio, ApiError> {
        self.hit("create_portfolio");
        let p = Portfolio {
            id: self.next_id(),
            name: body.name.clone(),
            description: body.description.clone(),
            holdings: vec![],
            transactions: vec![],
        };
        self.state.lock().unwrap().portfolios.push(p.clone());
        Ok(p)
    }

    async fn update_portfolio(&self, id: i64, body: &PortfolioUpdate) -> Result<Portfolio, ApiError> {
        self.hit("update_portfolio");
        let mut s = self.state.lock().unwrap();
        let p = s.portfolios.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found("Portfolio"))?;
        p.name = body.name.clone();
        p.description = body.description.clone();
        Ok(p.clone())
    }

    async fn add_transaction(&self, portfolio_id: i64, body: &TransactionCreate) -> Result<Transaction, ApiError> {
        self.hit("add_transaction");
        let tx = Transaction {
            id: self.next_id(),
            symbol: body.symbol.clone(),
            transaction_type: body.transaction_type,
            quantity: body.quantity,
            price: body.price,
            total_amount: body.quantity * body.price + body.fees,
            fees: body.fees,
            date: body.date.unwrap_or_else(|| day(2024, 3, 15)),
            notes: body.notes.clone(),
        };
        let mut s = self.state.lock().unwrap();
        let p = s
            .portfolios
            .iter_mut()
            .find(|p| p.id == portfolio_id)
            .ok_or_else(|| not_found("Portfolio"))?;
        p.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn update_prices(&self, _portfolio_id: i64) -> Result<(), ApiError> {
        self.hit("update_prices");
        Ok(())
    }

    async fn portfolio_summary(&self, portfolio_id: i64) -> Result<PortfolioSummary, ApiError> {
        self.hit("portfolio_summary");
        let p = self.get_portfolio(portfolio_id).await?;
        Ok(PortfolioSummary {
            total_value: p.holdings.iter().map(|h| h.market_value).sum(),
            total_gain_loss: p.holdings.iter().map(|h| h.gain_loss).sum(),
            gain_loss_percentage: Decimal::ZERO,
            allocation: Default::default(),
            last_updated: None,
        })
    }

    async fn performance(&self, _portfolio_id: i64, _timeframe: Timeframe) -> Result<Vec<PerformancePoint>, ApiError> {
        self.hit("performance");
        Ok(self.state.lock().unwrap().performance.clone())
    }

    async fn create_portfolio_alert(
        &self,
        portfolio_id: i64,
        body: &PortfolioAlertCreate,
    ) -> Result<PortfolioAlert, ApiError> {
        self.hit("create_portfolio_alert");
        Ok(PortfolioAlert {
            id: self.next_id(),
            portfolio_id,
            holding_id: body.holding_id,
            alert_type: body.alert_type,
            threshold: body.threshold,
            message: body.message.clone(),
            is_active: true,
            triggered_at: None,
            created_at: day(2024, 3, 15),
            updated_at: day(2024, 3, 15),
        })
    }
}

/// Client with a long freshness window so repeated reads hit the cache.
pub fn client(api: Arc<MockApi>) -> QueryClient {
    QueryClient::new(api, QueryCache::new(), Duration::from_secs(300))
}

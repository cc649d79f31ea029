// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::Api;
use crate::cache::{QueryCache, QueryKey};
use crate::error::ApiError;
use crate::models::{
    Budget, BudgetAlert, BudgetCreate, BudgetExpense, BudgetSummary, BudgetUpdate,
    CategorySpendingReport, ExpenseCreate, PerformancePoint, Portfolio, PortfolioAlert,
    PortfolioAlertCreate, PortfolioCreate, PortfolioSummary, PortfolioUpdate, Timeframe,
    Transaction, TransactionCreate,
};

/// Lifecycle of one fetch as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Success(T),
    Failure(ApiError),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<T> QueryState<T> {
    pub fn from_result(r: Result<T, ApiError>) -> Self {
        match r {
            Ok(v) => QueryState::Success(v),
            Err(e) => QueryState::Failure(e),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            QueryState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryState::Failure(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(v) => QueryState::Success(f(v)),
            QueryState::Failure(e) => QueryState::Failure(e),
        }
    }
}

/// Runs `fut` unless `token` is cancelled first. A result that lands after
/// cancellation is discarded.
pub async fn guarded<F>(token: &CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => {
            if token.is_cancelled() {
                None
            } else {
                Some(out)
            }
        }
    }
}

/// Cached reads and invalidating writes over an injected [`Api`].
#[derive(Clone)]
pub struct QueryClient {
    api: Arc<dyn Api>,
    cache: QueryCache,
    stale_after: Duration,
}

impl QueryClient {
    pub fn new(api: Arc<dyn Api>, cache: QueryCache, stale_after: Duration) -> Self {
        Self {
            api,
            cache,
            stale_after,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn api(&self) -> Arc<dyn Api> {
        Arc::clone(&self.api)
    }

    /// Serves `key` from cache while fresh, otherwise calls `fetcher` and caches the result.
    /// Failures are not cached, and neither is a response that a mutation invalidated
    /// while it was in flight.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ApiError>
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce(Arc<dyn Api>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(hit) = self.cache.get_fresh::<T>(&key, self.stale_after) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }
        let version = self.cache.version(&key);
        let value = fetcher(self.api()).await?;
        self.cache.insert_if_version(key, version, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache.invalidate(key)
    }

    fn invalidate_budgets(&self, budget_id: Option<i64>) {
        let n = self.cache.invalidate_where(|k| match (k, budget_id) {
            (QueryKey::Budget(id) | QueryKey::BudgetSummary(id), Some(b)) => *id == b,
            (QueryKey::Budget(_) | QueryKey::BudgetSummary(_), None) => false,
            _ => k.is_budget_scoped(),
        });
        debug!(invalidated = n, "budget mutation");
    }

    fn invalidate_portfolio(&self, portfolio_id: i64) {
        let n = self.cache.invalidate_where(|k| k.touches_portfolio(portfolio_id));
        debug!(invalidated = n, portfolio_id, "portfolio mutation");
    }

    // Budgets

    pub async fn budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.fetch(QueryKey::Budgets, |api| async move { api.list_budgets().await })
            .await
    }

    pub async fn budget(&self, id: i64) -> Result<Budget, ApiError> {
        self.fetch(QueryKey::Budget(id), |api| async move { api.get_budget(id).await })
            .await
    }

    pub async fn budget_summary(&self, id: i64) -> Result<BudgetSummary, ApiError> {
        self.fetch(QueryKey::BudgetSummary(id), |api| async move {
            api.budget_summary(id).await
        })
        .await
    }

    pub async fn category_spending(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CategorySpendingReport, ApiError> {
        if end < start {
            return Err(ApiError::validation("end_date must not be before start_date"));
        }
        self.fetch(QueryKey::CategorySpending { start, end }, |api| async move {
            api.category_spending(start, end).await
        })
        .await
    }

    pub async fn alerts(&self) -> Result<Vec<BudgetAlert>, ApiError> {
        self.fetch(QueryKey::BudgetAlerts, |api| async move { api.list_alerts().await })
            .await
    }

    pub async fn create_budget(&self, body: &BudgetCreate) -> Result<Budget, ApiError> {
        body.validate()?;
        let created = self.api.create_budget(body).await?;
        info!(budget_id = created.id, "budget created");
        self.invalidate_budgets(None);
        Ok(created)
    }

    pub async fn update_budget(&self, id: i64, body: &BudgetUpdate) -> Result<Budget, ApiError> {
        body.validate()?;
        let updated = self.api.update_budget(id, body).await?;
        info!(budget_id = id, "budget updated");
        self.invalidate_budgets(Some(id));
        Ok(updated)
    }

    pub async fn delete_budget(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete_budget(id).await?;
        info!(budget_id = id, "budget deleted");
        self.invalidate_budgets(Some(id));
        Ok(())
    }

    pub async fn add_expense(
        &self,
        budget_id: i64,
        body: &ExpenseCreate,
    ) -> Result<BudgetExpense, ApiError> {
        body.validate()?;
        let expense = self.api.add_expense(budget_id, body).await?;
        info!(budget_id, expense_id = expense.id, "expense recorded");
        self.invalidate_budgets(Some(budget_id));
        Ok(expense)
    }

    pub async fn dismiss_alert(&self, id: i64) -> Result<(), ApiError> {
        self.api.dismiss_alert(id).await?;
        info!(alert_id = id, "alert dismissed");
        self.cache.invalidate(&QueryKey::BudgetAlerts);
        Ok(())
    }

    // Investments

    pub async fn portfolios(&self) -> Result<Vec<Portfolio>, ApiError> {
        self.fetch(QueryKey::Portfolios, |api| async move {
            api.list_portfolios().await
        })
        .await
    }

    pub async fn portfolio(&self, id: i64) -> Result<Portfolio, ApiError> {
        self.fetch(QueryKey::Portfolio(id), |api| async move {
            api.get_portfolio(id).await
        })
        .await
    }

    pub async fn portfolio_summary(&self, id: i64) -> Result<PortfolioSummary, ApiError> {
        self.fetch(QueryKey::PortfolioSummary(id), |api| async move {
            api.portfolio_summary(id).await
        })
        .await
    }

    pub async fn performance(
        &self,
        id: i64,
        timeframe: Timeframe,
    ) -> Result<Vec<PerformancePoint>, ApiError> {
        self.fetch(QueryKey::Performance(id, timeframe), |api| async move {
            api.performance(id, timeframe).await
        })
        .await
    }

    pub async fn create_portfolio(&self, body: &PortfolioCreate) -> Result<Portfolio, ApiError> {
        body.validate()?;
        let created = self.api.create_portfolio(body).await?;
        info!(portfolio_id = created.id, "portfolio created");
        self.cache.invalidate(&QueryKey::Portfolios);
        Ok(created)
    }

    pub async fn update_portfolio(
        &self,
        id: i64,
        body: &PortfolioUpdate,
    ) -> Result<Portfolio, ApiError> {
        body.validate()?;
        let updated = self.api.update_portfolio(id, body).await?;
        info!(portfolio_id = id, "portfolio updated");
        self.invalidate_portfolio(id);
        Ok(updated)
    }

    pub async fn add_transaction(
        &self,
        portfolio_id: i64,
        body: &TransactionCreate,
    ) -> Result<Transaction, ApiError> {
        body.validate()?;
        let tx = self.api.add_transaction(portfolio_id, body).await?;
        info!(portfolio_id, transaction_id = tx.id, "transaction recorded");
        self.invalidate_portfolio(portfolio_id);
        Ok(tx)
    }

    pub async fn update_prices(&self, portfolio_id: i64) -> Result<(), ApiError> {
        self.api.update_prices(portfolio_id).await?;
        info!(portfolio_id, "prices refreshed");
        self.invalidate_portfolio(portfolio_id);
        Ok(())
    }

    pub async fn create_portfolio_alert(
        &self,
        portfolio_id: i64,
        body: &PortfolioAlertCreate,
    ) -> Result<PortfolioAlert, ApiError> {
        body.validate()?;
        let alert = self.api.create_portfolio_alert(portfolio_id, body).await?;
        info!(portfolio_id, alert_id = alert.id, "portfolio alert created");
        Ok(alert)
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    Budget, BudgetAlert, BudgetCreate, BudgetExpense, BudgetSummary, BudgetUpdate,
    CategorySpendingReport, ExpenseCreate, MessageResponse, PerformancePoint, Portfolio,
    PortfolioAlert, PortfolioAlertCreate, PortfolioCreate, PortfolioSummary, PortfolioUpdate,
    Timeframe, Transaction, TransactionCreate,
};

/// Every backend call the dashboards make.
#[async_trait]
pub trait Api: Send + Sync {
    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError>;
    async fn get_budget(&self, id: i64) -> Result<Budget, ApiError>;
    async fn create_budget(&self, body: &BudgetCreate) -> Result<Budget, ApiError>;
    async fn update_budget(&self, id: i64, body: &BudgetUpdate) -> Result<Budget, ApiError>;
    async fn delete_budget(&self, id: i64) -> Result<(), ApiError>;
    async fn add_expense(&self, budget_id: i64, body: &ExpenseCreate)
    -> Result<BudgetExpense, ApiError>;
    async fn budget_summary(&self, id: i64) -> Result<BudgetSummary, ApiError>;
    async fn category_spending(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CategorySpendingReport, ApiError>;
    async fn list_alerts(&self) -> Result<Vec<BudgetAlert>, ApiError>;
    async fn dismiss_alert(&self, id: i64) -> Result<(), ApiError>;

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, ApiError>;
    async fn get_portfolio(&self, id: i64) -> Result<Portfolio, ApiError>;
    async fn create_portfolio(&self, body: &PortfolioCreate) -> Result<Portfolio, ApiError>;
    async fn update_portfolio(&self, id: i64, body: &PortfolioUpdate)
    -> Result<Portfolio, ApiError>;
    async fn add_transaction(
        &self,
        portfolio_id: i64,
        body: &TransactionCreate,
    ) -> Result<Transaction, ApiError>;
    async fn update_prices(&self, portfolio_id: i64) -> Result<(), ApiError>;
    async fn portfolio_summary(&self, portfolio_id: i64) -> Result<PortfolioSummary, ApiError>;
    async fn performance(
        &self,
        portfolio_id: i64,
        timeframe: Timeframe,
    ) -> Result<Vec<PerformancePoint>, ApiError>;
    async fn create_portfolio_alert(
        &self,
        portfolio_id: i64,
        body: &PortfolioAlertCreate,
    ) -> Result<PortfolioAlert, ApiError>;
}

const UA: &str = concat!(
    "finboard/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/finboard)"
);

/// reqwest-backed [`Api`]. Paths are joined onto the configured base URL.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: std::time::Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        Self::new(&cfg.api_url, cfg.token.clone(), cfg.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let rb = self.client.request(method, url);
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    async fn send(&self, rb: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = rb.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_detail(status, &body);
        warn!(status = status.as_u16(), %message, "api call failed");
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.send(rb).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json(self.request(Method::GET, path)).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        info!(%method, path, "api mutation");
        self.json(self.request(method, path).json(body)).await
    }

    async fn ack(&self, method: Method, path: &str) -> Result<(), ApiError> {
        info!(%method, path, "api mutation");
        let resp = self.send(self.request(method, path)).await?;
        // Bodies are informational ({"message": ...}) and may be empty.
        let bytes = resp.bytes().await.unwrap_or_default();
        if let Ok(ack) = serde_json::from_slice::<MessageResponse>(&bytes) {
            debug!(message = %ack.message, "api ack");
        }
        Ok(())
    }
}

/// Pulls FastAPI-style `{"detail": ...}` out of an error body, falling back to the
/// raw text or the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        match v.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn query_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[async_trait]
impl Api for HttpApi {
    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.get("/budgets").await
    }

    async fn get_budget(&self, id: i64) -> Result<Budget, ApiError> {
        self.get(&format!("/budgets/{}", id)).await
    }

    async fn create_budget(&self, body: &BudgetCreate) -> Result<Budget, ApiError> {
        self.send_json(Method::POST, "/budgets", body).await
    }

    async fn update_budget(&self, id: i64, body: &BudgetUpdate) -> Result<Budget, ApiError> {
        self.send_json(Method::PUT, &format!("/budgets/{}", id), body)
            .await
    }

    async fn delete_budget(&self, id: i64) -> Result<(), ApiError> {
        self.ack(Method::DELETE, &format!("/budgets/{}", id)).await
    }

    async fn add_expense(
        &self,
        budget_id: i64,
        body: &ExpenseCreate,
    ) -> Result<BudgetExpense, ApiError> {
        self.send_json(Method::POST, &format!("/budgets/{}/expenses", budget_id), body)
            .await
    }

    async fn budget_summary(&self, id: i64) -> Result<BudgetSummary, ApiError> {
        self.get(&format!("/budgets/{}/summary", id)).await
    }

    async fn category_spending(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CategorySpendingReport, ApiError> {
        let rb = self
            .request(Method::GET, "/budgets/spending/categories")
            .query(&[
                ("start_date", query_datetime(start)),
                ("end_date", query_datetime(end)),
            ]);
        self.json(rb).await
    }

    async fn list_alerts(&self) -> Result<Vec<BudgetAlert>, ApiError> {
        self.get("/budgets/alerts").await
    }

    async fn dismiss_alert(&self, id: i64) -> Result<(), ApiError> {
        self.ack(Method::POST, &format!("/budgets/alerts/{}/dismiss", id))
            .await
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, ApiError> {
        self.get("/investments/portfolios").await
    }

    async fn get_portfolio(&self, id: i64) -> Result<Portfolio, ApiError> {
        self.get(&format!("/investments/portfolios/{}", id)).await
    }

    async fn create_portfolio(&self, body: &PortfolioCreate) -> Result<Portfolio, ApiError> {
        self.send_json(Method::POST, "/investments/portfolios", body)
            .await
    }

    async fn update_portfolio(
        &self,
        id: i64,
        body: &PortfolioUpdate,
    ) -> Result<Portfolio, ApiError> {
        self.send_json(Method::PUT, &format!("/investments/portfolios/{}", id), body)
            .await
    }

    async fn add_transaction(
        &self,
        portfolio_id: i64,
        body: &TransactionCreate,
    ) -> Result<Transaction, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/investments/portfolios/{}/transactions", portfolio_id),
            body,
        )
        .await
    }

    async fn update_prices(&self, portfolio_id: i64) -> Result<(), ApiError> {
        self.ack(
            Method::POST,
            &format!("/investments/portfolios/{}/update-prices", portfolio_id),
        )
        .await
    }

    async fn portfolio_summary(&self, portfolio_id: i64) -> Result<PortfolioSummary, ApiError> {
        self.get(&format!("/investments/portfolios/{}/summary", portfolio_id))
            .await
    }

    async fn performance(
        &self,
        portfolio_id: i64,
        timeframe: Timeframe,
    ) -> Result<Vec<PerformancePoint>, ApiError> {
        let rb = self
            .request(
                Method::GET,
                &format!("/investments/portfolios/{}/performance", portfolio_id),
            )
            .query(&[("timeframe", timeframe.as_str())]);
        self.json(rb).await
    }

    async fn create_portfolio_alert(
        &self,
        portfolio_id: i64,
        body: &PortfolioAlertCreate,
    ) -> Result<PortfolioAlert, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/investments/portfolios/{}/alerts", portfolio_id),
            body,
        )
        .await
    }
}

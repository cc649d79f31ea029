// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side checks run before a mutation is sent. They mirror what the backend
//! rejects so bad input fails fast with a readable message.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ApiError;
use crate::models::{
    BudgetCreate, BudgetUpdate, ExpenseCreate, PortfolioAlertCreate, PortfolioCreate,
    TransactionCreate,
};

static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-^=]{0,14}$").expect("valid symbol regex"));

fn non_blank(field: &str, v: &str) -> Result<(), ApiError> {
    if v.trim().is_empty() {
        return Err(ApiError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn positive(field: &str, v: Decimal) -> Result<(), ApiError> {
    if v <= Decimal::ZERO {
        return Err(ApiError::validation(format!("{} must be positive", field)));
    }
    Ok(())
}

pub fn symbol(s: &str) -> Result<(), ApiError> {
    if !SYMBOL_RE.is_match(s) {
        return Err(ApiError::validation(format!(
            "Invalid symbol '{}', expected an upper-case ticker like VTI or BRK.B",
            s
        )));
    }
    Ok(())
}

impl BudgetCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_blank("name", &self.name)?;
        positive("amount", self.amount)?;
        if let Some(end) = self.end_date {
            if end <= self.start_date {
                return Err(ApiError::validation("End date must be after start date"));
            }
        }
        Ok(())
    }
}

impl BudgetUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::validation("Nothing to update"));
        }
        if let Some(name) = &self.name {
            non_blank("name", name)?;
        }
        if let Some(amount) = self.amount {
            positive("amount", amount)?;
        }
        Ok(())
    }
}

impl ExpenseCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("amount", self.amount)
    }
}

impl PortfolioCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_blank("name", &self.name)
    }
}

impl TransactionCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        symbol(&self.symbol)?;
        positive("quantity", self.quantity)?;
        positive("price", self.price)?;
        if self.fees < Decimal::ZERO {
            return Err(ApiError::validation("fees must not be negative"));
        }
        Ok(())
    }
}

impl PortfolioAlertCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_blank("message", &self.message)?;
        positive("threshold", self.threshold)
    }
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard views. Each view owns its query states, its local UI state and a
//! mount token; responses that arrive after [`Mount::unmount`] are dropped.

pub mod alerts_panel;
pub mod budget_dashboard;
pub mod investment_dashboard;

pub use alerts_panel::AlertsPanel;
pub use budget_dashboard::{BudgetDashboard, BudgetOverview};
pub use investment_dashboard::{InvestmentDashboard, InvestmentOverview};

use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::query::QueryState;

#[derive(Debug, Clone, Default)]
pub struct Mount {
    token: CancellationToken,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mount that is torn down together with `self`.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn unmount(&self) {
        self.token.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Placeholder text for a state that has no data to draw.
pub(crate) fn placeholder<T>(state: &QueryState<T>, what: &str) -> Option<String> {
    match state {
        QueryState::Idle => Some(format!("{}: not loaded", what)),
        QueryState::Loading => Some(format!("{}: loading…", what)),
        QueryState::Failure(e) => Some(failure_text(what, e)),
        QueryState::Success(_) => None,
    }
}

fn failure_text(what: &str, e: &ApiError) -> String {
    format!("{}: {}", what, e.display_message())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use comfy_table::Cell;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Mount, placeholder};
use crate::alerts::{active_alerts, severity};
use crate::cache::QueryKey;
use crate::error::ApiError;
use crate::format::format_percent_value;
use crate::models::BudgetAlert;
use crate::query::{QueryClient, QueryState, guarded};
use crate::utils::{fmt_date, severity_cell, styled_table};

#[derive(Debug, Default)]
pub struct AlertsPanel {
    mount: Mount,
    alerts: QueryState<Vec<BudgetAlert>>,
    /// Version feed of the alerts key; changes when the cached list is replaced or invalidated.
    updates: Option<watch::Receiver<u64>>,
}

impl AlertsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(mount: Mount) -> Self {
        Self {
            mount,
            alerts: QueryState::Idle,
            updates: None,
        }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn state(&self) -> &QueryState<Vec<BudgetAlert>> {
        &self.alerts
    }

    /// Returns `false` when the response was discarded because the panel unmounted.
    pub async fn load(&mut self, client: &QueryClient) -> bool {
        if !self.mount.is_mounted() {
            return false;
        }
        self.alerts = QueryState::Loading;
        let token = self.mount.token().clone();
        match guarded(&token, client.alerts()).await {
            Some(result) => {
                self.alerts = QueryState::from_result(result.map(|all| active_alerts(&all)));
                let rx = self
                    .updates
                    .get_or_insert_with(|| client.cache().subscribe(QueryKey::BudgetAlerts));
                rx.mark_unchanged();
                true
            }
            None => {
                warn!("alerts response arrived after unmount; discarded");
                false
            }
        }
    }

    /// True once the cached alerts changed after the last load.
    pub fn is_outdated(&self) -> bool {
        self.updates
            .as_ref()
            .is_some_and(|rx| rx.has_changed().unwrap_or(false))
    }

    /// Reloads only when the alerts key moved since the last load.
    pub async fn refresh_if_outdated(&mut self, client: &QueryClient) -> bool {
        if !self.is_outdated() {
            return false;
        }
        debug!("alerts changed since last load; reloading");
        self.load(client).await
    }

    /// Dismisses on the server, then drops the alert from the local list.
    pub async fn dismiss(&mut self, client: &QueryClient, id: i64) -> Result<(), ApiError> {
        client.dismiss_alert(id).await?;
        if let Some(list) = self.alerts.data_mut() {
            list.retain(|a| a.id != id);
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        if let Some(text) = placeholder(&self.alerts, "Alerts") {
            return text;
        }
        let alerts = self.alerts.data().map(Vec::as_slice).unwrap_or_default();
        if alerts.is_empty() {
            return "No active alerts".to_string();
        }
        let rows = alerts
            .iter()
            .map(|a| {
                vec![
                    Cell::new(a.id),
                    severity_cell(severity(a.alert_type)),
                    Cell::new(a.alert_type.as_str()),
                    Cell::new(a.budget_id),
                    Cell::new(&a.message),
                    Cell::new(format_percent_value(a.threshold_percentage)),
                    Cell::new(fmt_date(&a.created_at)),
                ]
            })
            .collect();
        styled_table(
            &["ID", "Severity", "Type", "Budget", "Message", "Threshold", "Raised"],
            rows,
        )
        .to_string()
    }
}

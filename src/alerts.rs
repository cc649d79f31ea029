// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

use crate::models::{AlertStatus, AlertType, BudgetAlert};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

pub fn severity(t: AlertType) -> Severity {
    match t {
        AlertType::Overspent => Severity::Error,
        AlertType::ApproachingLimit => Severity::Warning,
        AlertType::RecurringDue | AlertType::Threshold => Severity::Info,
    }
}

/// Active alerts, most severe first; same severity keeps newest first.
pub fn active_alerts(alerts: &[BudgetAlert]) -> Vec<BudgetAlert> {
    let mut out: Vec<BudgetAlert> = alerts
        .iter()
        .filter(|a| a.status == AlertStatus::Active)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        severity(a.alert_type)
            .cmp(&severity(b.alert_type))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    out
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::sync::Arc;

use common::*;
use finboard::cache::QueryKey;
use finboard::error::ApiError;
use finboard::models::*;
use finboard::query::QueryState;
use finboard::views::{AlertsPanel, BudgetDashboard, InvestmentDashboard};
use tokio::sync::Notify;

fn seeded() -> MockState {
    MockState {
        budgets: vec![
            budget(1, BudgetCategory::Food, "400", Some("380")),
            budget(2, BudgetCategory::Housing, "1500", Some("900")),
        ],
        alerts: vec![
            alert(3, AlertType::Threshold),
            alert(7, AlertType::Overspent),
            alert(9, AlertType::ApproachingLimit),
        ],
        portfolios: vec![portfolio(
            1,
            "Core",
            vec![holding(1, "VTI", AssetType::Etf, "1200", "200", "20")],
            vec![transaction(1, "VTI", day(2024, 3, 5))],
        )],
        performance: vec![],
    }
}

#[tokio::test]
async fn dismissed_alert_is_gone_from_next_fetch() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());

    let mut panel = AlertsPanel::new();
    assert!(panel.load(&client).await);
    let ids: Vec<i64> = panel.state().data().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![7, 9, 3]);

    panel.dismiss(&client, 7).await.unwrap();
    let local: Vec<i64> = panel.state().data().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(local, vec![9, 3]);

    assert!(panel.load(&client).await);
    let fetched: Vec<i64> = panel.state().data().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(fetched, vec![9, 3]);
    assert_eq!(api.calls("list_alerts"), 2);
}

#[tokio::test]
async fn failed_dismiss_keeps_alert() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());
    let mut panel = AlertsPanel::new();
    panel.load(&client).await;

    let err = panel.dismiss(&client, 42).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(panel.state().data().unwrap().len(), 3);
}

#[tokio::test]
async fn fresh_reads_are_served_from_cache() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());

    client.budgets().await.unwrap();
    client.budgets().await.unwrap();
    assert_eq!(api.calls("list_budgets"), 1);
    assert!(client.cache().get::<Vec<Budget>>(&QueryKey::Budgets).is_some());
}

#[tokio::test]
async fn expense_invalidates_budget_entries_and_notifies() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());

    client.budgets().await.unwrap();
    client.budget_summary(1).await.unwrap();
    client.budget_summary(2).await.unwrap();
    let mut rx = client.cache().subscribe(QueryKey::Budgets);
    let seen = *rx.borrow_and_update();

    let body = ExpenseCreate {
        amount: dec("15"),
        transaction_id: None,
        description: Some("lunch".into()),
        date: None,
    };
    client.add_expense(1, &body).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_ne!(*rx.borrow_and_update(), seen);
    assert!(client.cache().get::<Vec<Budget>>(&QueryKey::Budgets).is_none());
    assert!(client.cache().get::<BudgetSummary>(&QueryKey::BudgetSummary(1)).is_none());
    assert!(client.cache().get::<BudgetSummary>(&QueryKey::BudgetSummary(2)).is_some());

    let budgets = client.budgets().await.unwrap();
    assert_eq!(api.calls("list_budgets"), 2);
    assert_eq!(budgets[0].spent, Some(dec("395")));
}

#[tokio::test]
async fn trade_invalidates_only_that_portfolio() {
    let mut state = seeded();
    state.portfolios.push(portfolio(2, "Side", vec![], vec![]));
    let api = Arc::new(MockApi::with_state(state));
    let client = client(api.clone());

    client.portfolios().await.unwrap();
    client.portfolio(1).await.unwrap();
    client.portfolio(2).await.unwrap();
    client.performance(1, Timeframe::OneMonth).await.unwrap();

    let body = TransactionCreate {
        transaction_type: TransactionType::Buy,
        symbol: "VTI".into(),
        asset_type: AssetType::Etf,
        quantity: dec("2"),
        price: dec("250"),
        fees: dec("1"),
        date: Some(day(2024, 3, 20)),
        notes: None,
    };
    let tx = client.add_transaction(1, &body).await.unwrap();
    assert_eq!(tx.total_amount, dec("501"));

    let cache = client.cache();
    assert!(cache.get::<Vec<Portfolio>>(&QueryKey::Portfolios).is_none());
    assert!(cache.get::<Portfolio>(&QueryKey::Portfolio(1)).is_none());
    assert!(cache.get::<Vec<PerformancePoint>>(&QueryKey::Performance(1, Timeframe::OneMonth)).is_none());
    assert!(cache.get::<Portfolio>(&QueryKey::Portfolio(2)).is_some());
}

#[tokio::test]
async fn read_overtaken_by_a_mutation_is_not_cached() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(MockApi::with_state(seeded()).gated(gate.clone()));
    let client = client(api.clone());

    let reader = {
        let client = client.clone();
        tokio::spawn(async move { client.budgets().await })
    };
    while api.calls("list_budgets") == 0 {
        tokio::task::yield_now().await;
    }

    let body = BudgetCreate {
        name: "Trip".into(),
        category: BudgetCategory::Entertainment,
        amount: dec("300"),
        period: BudgetPeriod::Monthly,
        start_date: day(2024, 3, 1),
        end_date: None,
    };
    client.create_budget(&body).await.unwrap();
    gate.notify_one();
    reader.await.unwrap().unwrap();
    assert!(client.cache().get::<Vec<Budget>>(&QueryKey::Budgets).is_none());

    gate.notify_one();
    let budgets = client.budgets().await.unwrap();
    assert_eq!(api.calls("list_budgets"), 2);
    assert_eq!(budgets.len(), 3);

    // Settled reads cache as usual.
    client.budgets().await.unwrap();
    assert_eq!(api.calls("list_budgets"), 2);
}

#[tokio::test]
async fn alerts_panel_reloads_after_alerts_change_elsewhere() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());

    let mut panel = AlertsPanel::new();
    assert!(!panel.is_outdated());
    assert!(panel.load(&client).await);
    assert!(!panel.is_outdated());
    assert!(!panel.refresh_if_outdated(&client).await);
    assert_eq!(api.calls("list_alerts"), 1);

    client.dismiss_alert(3).await.unwrap();
    assert!(panel.is_outdated());

    assert!(panel.refresh_if_outdated(&client).await);
    let ids: Vec<i64> = panel.state().data().unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![7, 9]);
    assert_eq!(api.calls("list_alerts"), 2);
    assert!(!panel.is_outdated());
}

#[tokio::test]
async fn invalid_payload_never_reaches_the_backend() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());
    let body = BudgetCreate {
        name: "Trip".into(),
        category: BudgetCategory::Entertainment,
        amount: dec("-5"),
        period: BudgetPeriod::Monthly,
        start_date: day(2024, 3, 1),
        end_date: None,
    };
    let err = client.create_budget(&body).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(api.calls("create_budget"), 0);
}

#[tokio::test]
async fn failures_surface_as_failure_state() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api);
    let state = QueryState::from_result(client.budget(99).await);
    assert!(state.error().unwrap().is_not_found());
    assert!(state.data().is_none());
}

#[tokio::test]
async fn response_after_unmount_leaves_view_untouched() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(MockApi::with_state(seeded()).gated(gate.clone()));
    let client = client(api.clone());

    let mut view = InvestmentDashboard::new();
    let mount = view.mount().clone();
    let load = tokio::spawn(async move {
        let applied = view.load(&client).await;
        (applied, view)
    });

    while api.calls("list_portfolios") == 0 {
        tokio::task::yield_now().await;
    }
    mount.unmount();
    gate.notify_one();

    let (applied, view) = load.await.unwrap();
    assert!(!applied);
    assert!(view.portfolios().is_loading());
    assert!(view.overview().is_none());
}

#[tokio::test]
async fn unmounting_dashboard_also_stops_its_alerts_panel() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api.clone());
    let mut view = BudgetDashboard::new();
    view.mount().unmount();

    assert!(!view.alerts().mount().is_mounted());
    assert!(!view.load(&client).await);
    assert!(view.budgets().is_idle());
    assert_eq!(api.calls("list_budgets"), 0);
}

#[tokio::test]
async fn budget_dashboard_renders_totals_and_alerts() {
    let api = Arc::new(MockApi::with_state(seeded()));
    let client = client(api);
    let mut view = BudgetDashboard::new();
    assert!(view.load(&client).await);

    let totals = view.totals().unwrap();
    assert_eq!(totals.total_budgeted, dec("1900"));
    assert_eq!(totals.total_remaining, dec("620"));

    let cats: Vec<BudgetCategory> = view.categories().iter().map(|c| c.category).collect();
    assert_eq!(cats, vec![BudgetCategory::Housing, BudgetCategory::Food]);

    view.category_filter = Some(BudgetCategory::Food);
    assert_eq!(view.totals().unwrap().total_budgeted, dec("400"));

    let text = view.render();
    assert!(text.contains("$400.00"));
    assert!(text.contains("overspent"));

    view.dismiss_alert(&client, 7).await.unwrap();
    assert!(!view.render().contains("overspent"));
    assert_eq!(view.overview().unwrap().alerts.len(), 2);
}

#[tokio::test]
async fn investment_dashboard_loads_selected_performance() {
    let mut state = seeded();
    state.performance = vec![PerformancePoint {
        date: day(2024, 3, 1),
        total_value: dec("1200"),
        daily_return: None,
        total_return: Some(dec("20")),
    }];
    let api = Arc::new(MockApi::with_state(state));
    let client = client(api.clone());

    let mut view = InvestmentDashboard::new();
    view.select_portfolio(Some(1));
    view.select_timeframe(Timeframe::ThreeMonths);
    assert!(view.load(&client).await);
    assert_eq!(view.performance().data().unwrap().len(), 1);

    view.select_timeframe(Timeframe::OneMonth);
    assert!(view.performance().is_idle());

    let ov = view.overview().unwrap();
    assert_eq!(ov.fleet.total_value, dec("1200"));
    assert_eq!(ov.best.unwrap().name, "Core");
    assert!(view.render().contains("Performance 1M: not loaded"));
}

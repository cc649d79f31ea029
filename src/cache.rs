// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::models::Timeframe;

/// Identity of a cached query. One variant per backend read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Budgets,
    Budget(i64),
    BudgetSummary(i64),
    BudgetAlerts,
    CategorySpending {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Portfolios,
    Portfolio(i64),
    PortfolioSummary(i64),
    Performance(i64, Timeframe),
}

impl QueryKey {
    /// Entries that depend on budget data (spending, alerts, summaries).
    pub fn is_budget_scoped(&self) -> bool {
        matches!(
            self,
            QueryKey::Budgets
                | QueryKey::Budget(_)
                | QueryKey::BudgetSummary(_)
                | QueryKey::BudgetAlerts
                | QueryKey::CategorySpending { .. }
        )
    }

    /// Entries describing one portfolio, plus the list that embeds it.
    pub fn touches_portfolio(&self, id: i64) -> bool {
        match self {
            QueryKey::Portfolios => true,
            QueryKey::Portfolio(p) | QueryKey::PortfolioSummary(p) | QueryKey::Performance(p, _) => {
                *p == id
            }
            _ => false,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Budgets => write!(f, "budgets"),
            QueryKey::Budget(id) => write!(f, "budgets/{}", id),
            QueryKey::BudgetSummary(id) => write!(f, "budgets/{}/summary", id),
            QueryKey::BudgetAlerts => write!(f, "budgets/alerts"),
            QueryKey::CategorySpending { start, end } => {
                write!(f, "budgets/spending/categories?{}..{}", start, end)
            }
            QueryKey::Portfolios => write!(f, "portfolios"),
            QueryKey::Portfolio(id) => write!(f, "portfolios/{}", id),
            QueryKey::PortfolioSummary(id) => write!(f, "portfolios/{}/summary", id),
            QueryKey::Performance(id, tf) => write!(f, "portfolios/{}/performance?{}", id, tf),
        }
    }
}

struct CacheEntry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    fetched_at: Option<Instant>,
    version: watch::Sender<u64>,
}

impl CacheEntry {
    fn empty() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            data: None,
            fetched_at: None,
            version,
        }
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

/// Shared response cache keyed by [`QueryKey`].
///
/// Each key carries the last payload, when it was fetched, and a version channel that
/// subscribers watch; the version moves on every insert and invalidation.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        let entry = self.entries.get(key)?;
        let data = entry.data.as_ref()?;
        data.downcast_ref::<T>().cloned()
    }

    /// Like [`get`](Self::get) but only when fetched within `max_age`.
    pub fn get_fresh<T>(&self, key: &QueryKey, max_age: Duration) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        if !self.is_fresh(key, max_age) {
            return None;
        }
        self.get(key)
    }

    pub fn is_fresh(&self, key: &QueryKey, max_age: Duration) -> bool {
        self.entries
            .get(key)
            .and_then(|e| if e.data.is_some() { e.fetched_at } else { None })
            .is_some_and(|at| at.elapsed() <= max_age)
    }

    pub fn fetched_at(&self, key: &QueryKey) -> Option<Instant> {
        self.entries.get(key).and_then(|e| e.fetched_at)
    }

    /// Drops the payload for `key` and moves its version. Subscribers stay attached and
    /// are notified. Returns whether data was dropped.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return false;
        };
        let had_data = entry.data.take().is_some();
        entry.fetched_at = None;
        entry.bump();
        if had_data {
            debug!(%key, "cache invalidate");
        }
        had_data
    }

    /// Invalidates every key matching `pred`; returns how many held data.
    ///
    /// Entries without data still move their version so in-flight reads for them
    /// are not cached.
    pub fn invalidate_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&QueryKey) -> bool,
    {
        let mut n = 0;
        for mut entry in self.entries.iter_mut() {
            if !pred(entry.key()) {
                continue;
            }
            if entry.data.is_some() {
                debug!(key = %entry.key(), "cache invalidate");
                n += 1;
            }
            let value = entry.value_mut();
            value.data = None;
            value.fetched_at = None;
            value.bump();
        }
        n
    }

    /// Current version of `key`. Creates an empty entry so later invalidations count.
    pub fn version(&self, key: &QueryKey) -> u64 {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::empty);
        *entry.version.borrow()
    }

    /// Stores `value` only if `key` is still at `expected`, i.e. nothing invalidated or
    /// replaced it since the read started.
    pub fn insert_if_version<T>(&self, key: QueryKey, expected: u64, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        let mut entry = self.entries.entry(key).or_insert_with(CacheEntry::empty);
        let current = *entry.version.borrow();
        if current != expected {
            debug!(key = %entry.key(), expected, current, "outdated response not cached");
            return false;
        }
        debug!(key = %entry.key(), "cache insert");
        entry.data = Some(Arc::new(value));
        entry.fetched_at = Some(Instant::now());
        entry.bump();
        true
    }

    /// Receiver whose value changes whenever `key` is filled or invalidated.
    pub fn subscribe(&self, key: QueryKey) -> watch::Receiver<u64> {
        self.entries
            .entry(key)
            .or_insert_with(CacheEntry::empty)
            .version
            .subscribe()
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entries
            .get(key)
            .map(|e| e.version.receiver_count())
            .unwrap_or(0)
    }

    /// Number of keys currently holding data.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put<T: Any + Send + Sync>(cache: &QueryCache, key: QueryKey, value: T) {
        let v = cache.version(&key);
        assert!(cache.insert_if_version(key, v, value));
    }

    #[test]
    fn insert_then_get_typed() {
        let cache = QueryCache::new();
        put(&cache, QueryKey::Budgets, vec![1u32, 2, 3]);
        assert_eq!(cache.get::<Vec<u32>>(&QueryKey::Budgets), Some(vec![1, 2, 3]));
        // Wrong type is a miss, not a panic.
        assert_eq!(cache.get::<String>(&QueryKey::Budgets), None);
        assert!(cache.is_fresh(&QueryKey::Budgets, Duration::from_secs(60)));
        assert!(cache.fetched_at(&QueryKey::Budgets).is_some());
    }

    #[test]
    fn invalidate_notifies_subscribers_and_keeps_them() {
        let cache = QueryCache::new();
        let mut rx = cache.subscribe(QueryKey::BudgetAlerts);
        put(&cache, QueryKey::BudgetAlerts, "alerts".to_string());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(cache.invalidate(&QueryKey::BudgetAlerts));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);
        assert_eq!(cache.get::<String>(&QueryKey::BudgetAlerts), None);
        assert_eq!(cache.subscriber_count(&QueryKey::BudgetAlerts), 1);

        // Nothing left to drop.
        assert!(!cache.invalidate(&QueryKey::BudgetAlerts));
    }

    #[test]
    fn invalidate_where_scopes_by_portfolio() {
        let cache = QueryCache::new();
        put(&cache, QueryKey::Portfolios, 0u8);
        put(&cache, QueryKey::Portfolio(1), 1u8);
        put(&cache, QueryKey::Portfolio(2), 2u8);
        put(&cache, QueryKey::Performance(1, Timeframe::OneMonth), 3u8);
        put(&cache, QueryKey::Budgets, 4u8);

        let dropped = cache.invalidate_where(|k| k.touches_portfolio(1));
        assert_eq!(dropped, 3);
        assert_eq!(cache.get::<u8>(&QueryKey::Portfolio(2)), Some(2));
        assert_eq!(cache.get::<u8>(&QueryKey::Budgets), Some(4));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn insert_is_refused_after_an_invalidation() {
        let cache = QueryCache::new();
        let v = cache.version(&QueryKey::Budgets);
        assert_eq!(cache.invalidate_where(|k| k.is_budget_scoped()), 0);
        assert!(!cache.insert_if_version(QueryKey::Budgets, v, 1u8));
        assert_eq!(cache.get::<u8>(&QueryKey::Budgets), None);

        let v = cache.version(&QueryKey::Budgets);
        assert!(cache.insert_if_version(QueryKey::Budgets, v, 2u8));
        assert_eq!(cache.get::<u8>(&QueryKey::Budgets), Some(2));
    }

    #[test]
    fn zero_max_age_is_stale_after_any_delay() {
        let cache = QueryCache::new();
        put(&cache, QueryKey::Portfolios, 1u8);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get_fresh::<u8>(&QueryKey::Portfolios, Duration::ZERO), None);
        assert_eq!(cache.get::<u8>(&QueryKey::Portfolios), Some(1));
    }
}

//! Exchange rate table and the store that caches it.

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// A snapshot of exchange rates keyed by currency code, all expressed
/// relative to `base` (1 unit of base = rate units of target).
#[derive(Debug, Clone)]
pub struct RateTable {
    pub base: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Builds a table from raw API rates. Non-finite and non-positive
    /// entries are dropped; an empty surviving table is a data error.
    pub fn new(base: &str, raw: HashMap<String, f64>) -> Result<Self> {
        let rates: HashMap<String, f64> = raw
            .into_iter()
            .filter(|(code, rate)| {
                let ok = rate.is_finite() && *rate > 0.0;
                if !ok {
                    debug!(code = %code, rate = *rate, "Dropping unusable rate entry");
                }
                ok
            })
            .collect();

        if rates.is_empty() {
            return Err(Error::data(format!("no usable rates for base {base}")));
        }

        Ok(RateTable {
            base: base.to_string(),
            rates,
        })
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full rate table for the given base currency.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

/// Caches the most recent rate table and the time it was fetched.
///
/// The table is replaced wholesale on every successful refresh. Each
/// refresh gets a generation number; a completed fetch is only installed
/// when no newer refresh started in the meantime, so a stale response can
/// never overwrite fresher rates.
pub struct RateStore {
    provider: Box<dyn RateProvider>,
    table: Option<RateTable>,
    last_update: Option<DateTime<Utc>>,
    generation: u64,
}

impl RateStore {
    pub fn new(provider: Box<dyn RateProvider>) -> Self {
        RateStore {
            provider,
            table: None,
            last_update: None,
            generation: 0,
        }
    }

    pub fn table(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// True when the cached table is missing or keyed to a different base.
    pub fn needs_refresh(&self, base: &str) -> bool {
        self.table.as_ref().is_none_or(|t| t.base != base)
    }

    /// Fetches a fresh table for `base` and installs it, unless a newer
    /// refresh superseded this one while the fetch was in flight.
    pub async fn refresh(&mut self, base: &str) -> Result<()> {
        let generation = self.begin_refresh();
        debug!(base, generation, "Refreshing rate table");

        let table = self.provider.fetch_rates(base).await?;
        self.install(generation, table);
        Ok(())
    }

    fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Installs a fetched table if its generation is still current.
    fn install(&mut self, generation: u64, table: RateTable) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Discarding stale rate table");
            return false;
        }
        debug!(base = %table.base, count = table.len(), "Installed rate table");
        self.table = Some(table);
        self.last_update = Some(Utc::now());
        true
    }

    /// Refreshes only when the cached table is not keyed to `base`.
    pub async fn ensure_base(&mut self, base: &str) -> Result<()> {
        if self.needs_refresh(base) {
            self.refresh(base).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    struct FixedProvider {
        rates: HashMap<String, f64>,
    }

    #[async_trait]
    impl RateProvider for FixedProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
            RateTable::new(base, self.rates.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        async fn fetch_rates(&self, _base: &str) -> Result<RateTable> {
            Err(Error::network("connection refused"))
        }
    }

    #[test]
    fn test_table_drops_unusable_rates() {
        let table = RateTable::new(
            "USD",
            raw(&[
                ("EUR", 0.85),
                ("BAD", f64::NAN),
                ("NEG", -1.0),
                ("ZERO", 0.0),
                ("INF", f64::INFINITY),
            ]),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rate("EUR"), Some(0.85));
        assert_eq!(table.rate("BAD"), None);
    }

    #[test]
    fn test_table_with_no_usable_rates_is_data_error() {
        let result = RateTable::new("USD", raw(&[("BAD", f64::NAN)]));
        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn test_refresh_replaces_table_wholesale() {
        let mut store = RateStore::new(Box::new(FixedProvider {
            rates: raw(&[("USD", 1.0), ("EUR", 0.85)]),
        }));

        assert!(store.needs_refresh("USD"));
        assert!(store.last_update().is_none());

        store.refresh("USD").await.unwrap();
        assert!(!store.needs_refresh("USD"));
        assert!(store.needs_refresh("EUR"));
        assert!(store.last_update().is_some());
        assert_eq!(store.table().unwrap().rate("EUR"), Some(0.85));

        store.refresh("EUR").await.unwrap();
        assert_eq!(store.table().unwrap().base, "EUR");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_table() {
        let mut store = RateStore::new(Box::new(FixedProvider {
            rates: raw(&[("USD", 1.0), ("EUR", 0.85)]),
        }));
        store.refresh("USD").await.unwrap();
        let updated = store.last_update();

        store.provider = Box::new(FailingProvider);
        let result = store.refresh("EUR").await;
        assert!(matches!(result, Err(Error::Network(_))));

        // Previous table and timestamp survive the failure.
        assert_eq!(store.table().unwrap().base, "USD");
        assert_eq!(store.last_update(), updated);
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_discarded() {
        let mut store = RateStore::new(Box::new(FixedProvider {
            rates: raw(&[("USD", 1.0), ("EUR", 0.85)]),
        }));

        // A second refresh starts while the first fetch is in flight.
        let stale = store.begin_refresh();
        let current = store.begin_refresh();

        let old_table = RateTable::new("USD", raw(&[("EUR", 0.80)])).unwrap();
        assert!(!store.install(stale, old_table));
        assert!(store.table().is_none());

        let new_table = RateTable::new("EUR", raw(&[("USD", 1.176)])).unwrap();
        assert!(store.install(current, new_table));
        assert_eq!(store.table().unwrap().base, "EUR");
        assert_eq!(store.table().unwrap().rate("USD"), Some(1.176));
    }

    #[tokio::test]
    async fn test_ensure_base_skips_fetch_when_cached() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingProvider {
            calls: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl RateProvider for CountingProvider {
            async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                RateTable::new(base, raw(&[("USD", 1.0), ("EUR", 0.85)]))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = RateStore::new(Box::new(CountingProvider {
            calls: Arc::clone(&calls),
        }));

        store.ensure_base("USD").await.unwrap();
        store.ensure_base("USD").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.ensure_base("EUR").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

//! Bounded, persisted log of past conversions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// The log keeps at most this many entries, newest first.
pub const MAX_ENTRIES: usize = 20;

/// One recorded conversion. Field names follow the persisted JSON slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub amount: f64,
    pub from_currency: String,
    pub result: f64,
    pub to_currency: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// Storage capability for the serialized history, so the backing medium
/// (disk keyspace, memory, remote store) is swappable.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn load(&self) -> anyhow::Result<Vec<HistoryEntry>>;
    async fn save(&self, entries: &[HistoryEntry]) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Owns the in-memory entries and mirrors every change to the repository.
///
/// A storage failure never fails the conversion that triggered it; the
/// in-memory log stays authoritative and the failure is logged.
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryLog {
    /// Loads persisted entries once at startup. An unreadable store starts
    /// the session with an empty log.
    pub async fn open(repository: Arc<dyn HistoryRepository>) -> Self {
        let entries = match repository.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Could not load conversion history");
                Vec::new()
            }
        };
        HistoryLog {
            entries,
            repository,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a successful manual conversion: prepends, truncates to
    /// [`MAX_ENTRIES`], and persists the full list.
    pub async fn record(
        &mut self,
        amount: f64,
        from_currency: &str,
        result: f64,
        to_currency: &str,
        rate: f64,
    ) -> &HistoryEntry {
        let now = Utc::now();
        let entry = HistoryEntry {
            id: self.next_id(now),
            amount,
            from_currency: from_currency.to_string(),
            result,
            to_currency: to_currency.to_string(),
            rate,
            timestamp: now,
        };

        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);

        if let Err(e) = self.repository.save(&self.entries).await {
            warn!(error = %e, "Could not persist conversion history");
        }

        &self.entries[0]
    }

    /// Removes all entries and the persisted copy. Callers are expected to
    /// have confirmed with the user first.
    pub async fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.repository.clear().await {
            warn!(error = %e, "Could not clear persisted history");
        }
    }

    /// Entry ids are millisecond timestamps, bumped to stay strictly
    /// increasing when two conversions land in the same millisecond.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        match self.entries.first() {
            Some(newest) if newest.id >= candidate => newest.id + 1,
            _ => candidate,
        }
    }
}

/// Human-readable age of a timestamp relative to `now`.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

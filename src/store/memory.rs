use crate::core::history::{HistoryEntry, HistoryRepository};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory history store. Used in tests and as a fallback when no disk
/// store can be opened; entries do not outlive the process.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Vec<HistoryEntry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        debug!(count = entries.len(), "History SAVE");
        *self.inner.lock().await = entries.to_vec();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        debug!("History CLEAR");
        self.inner.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: i64) -> HistoryEntry {
        HistoryEntry {
            id,
            amount: 100.0,
            from_currency: "USD".to_string(),
            result: 85.0,
            to_currency: "EUR".to_string(),
            rate: 0.85,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let repository = MemoryRepository::new();
        assert!(repository.load().await.unwrap().is_empty());

        repository.save(&[entry(2), entry(1)]).await.unwrap();
        let loaded = repository.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 2);
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let repository = MemoryRepository::new();
        repository.save(&[entry(1)]).await.unwrap();

        repository.clear().await.unwrap();
        assert!(repository.load().await.unwrap().is_empty());
    }
}

use crate::core::history::{HistoryEntry, HistoryRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// The single slot holding the JSON-serialized entry array.
const HISTORY_KEY: &str = "currencyHistory";

/// Disk-backed history store: a fjall keyspace with one partition and one
/// key, rewritten wholesale on every save.
pub struct DiskRepository {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRepository {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path.join("history"))
            .open()
            .context("Failed to open history keyspace")?;
        let partition = keyspace
            .open_partition("history", PartitionCreateOptions::default())
            .context("Failed to open history partition")?;

        Ok(DiskRepository {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl HistoryRepository for DiskRepository {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        match self.partition.get(HISTORY_KEY)? {
            Some(bytes) => {
                let entries: Vec<HistoryEntry> = serde_json::from_slice(&bytes)
                    .context("Failed to parse persisted history")?;
                debug!(count = entries.len(), "History LOAD");
                Ok(entries)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let bytes = serde_json::to_vec(entries)?;
        self.partition.insert(HISTORY_KEY, bytes)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(count = entries.len(), "History SAVE");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.partition.remove(HISTORY_KEY)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("History CLEAR");
        Ok(())
    }
}

//! Per-category high-water mark persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use msgvault_types::{BackupError, Category, Timestamp};

/// Persists, per category, the timestamp of the most recently archived
/// record.
///
/// Watermarks only ever advance; the engine is the sole writer.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// The newest archived timestamp for a category, if any run recorded
    /// one.
    async fn get(&self, category: Category) -> Result<Option<Timestamp>, BackupError>;

    /// Advance a category's watermark.
    async fn set(&self, category: Category, timestamp: Timestamp)
        -> Result<(), BackupError>;

    /// Whether no category has ever recorded a watermark.
    ///
    /// A first-ever run that finds nothing to archive writes baseline
    /// watermarks so this flips false afterwards.
    async fn is_first_run(&self) -> Result<bool, BackupError> {
        for category in Category::IN_PRIORITY_ORDER {
            if self.get(category).await?.is_some() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// In-memory watermark store.
///
/// Clones share state, so tests can hold a handle while the engine owns
/// another.
#[derive(Debug, Default)]
pub struct MemoryWatermarkStore {
    inner: Arc<Mutex<HashMap<Category, Timestamp>>>,
}

impl MemoryWatermarkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current watermark map.
    pub fn snapshot(&self) -> HashMap<Category, Timestamp> {
        self.inner.lock().unwrap().clone()
    }
}

impl Clone for MemoryWatermarkStore {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn get(&self, category: Category) -> Result<Option<Timestamp>, BackupError> {
        Ok(self.inner.lock().unwrap().get(&category).copied())
    }

    async fn set(
        &self,
        category: Category,
        timestamp: Timestamp,
    ) -> Result<(), BackupError> {
        self.inner.lock().unwrap().insert(category, timestamp);
        Ok(())
    }
}

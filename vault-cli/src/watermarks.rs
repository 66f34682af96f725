//! Watermark persistence backed by a JSON file.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use msgvault_engine::WatermarkStore;
use msgvault_types::{BackupError, Category, Timestamp};

/// Watermark store persisted as `watermarks.json` in the data directory.
///
/// The file maps category names to epoch milliseconds. A missing file means
/// nothing has ever been archived.
#[derive(Debug, Clone)]
pub struct JsonWatermarkStore {
    path: PathBuf,
}

impl JsonWatermarkStore {
    /// Create a store over `<data_dir>/watermarks.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self { path: data_dir.join("watermarks.json") }
    }

    /// Every stored watermark.
    pub async fn all(&self) -> Result<HashMap<Category, Timestamp>, BackupError> {
        let marks = self.read_file().await?;
        Ok(marks
            .into_iter()
            .map(|(category, millis)| (category, Timestamp::new(millis)))
            .collect())
    }

    /// Clear one watermark, or all of them.
    pub async fn clear(&self, category: Option<Category>) -> Result<(), BackupError> {
        match category {
            Some(category) => {
                let mut marks = self.read_file().await?;
                marks.remove(&category);
                self.write_file(&marks).await
            }
            None => match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(watermark_error(e)),
            },
        }
    }

    async fn read_file(&self) -> Result<HashMap<Category, u64>, BackupError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| BackupError::DataAccess(format!("watermark file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(watermark_error(e)),
        }
    }

    async fn write_file(&self, marks: &HashMap<Category, u64>) -> Result<(), BackupError> {
        let contents = serde_json::to_string_pretty(marks)
            .map_err(|e| BackupError::DataAccess(format!("watermark file: {}", e)))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(watermark_error)
    }
}

#[async_trait]
impl WatermarkStore for JsonWatermarkStore {
    async fn get(&self, category: Category) -> Result<Option<Timestamp>, BackupError> {
        let marks = self.read_file().await?;
        Ok(marks.get(&category).map(|millis| Timestamp::new(*millis)))
    }

    async fn set(&self, category: Category, timestamp: Timestamp) -> Result<(), BackupError> {
        let mut marks = self.read_file().await?;
        marks.insert(category, timestamp.millis());
        self.write_file(&marks).await
    }
}

fn watermark_error(error: std::io::Error) -> BackupError {
    BackupError::DataAccess(format!("watermark file: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonWatermarkStore::new(dir.path());

        assert_eq!(store.get(Category::Sms).await.unwrap(), None);

        store.set(Category::Sms, Timestamp::new(1234)).await.unwrap();
        assert_eq!(
            store.get(Category::Sms).await.unwrap(),
            Some(Timestamp::new(1234))
        );
        assert_eq!(store.get(Category::Mms).await.unwrap(), None);
    }

    #[tokio::test]
    async fn survives_a_new_store_instance() {
        let dir = tempdir().unwrap();
        JsonWatermarkStore::new(dir.path())
            .set(Category::Chat, Timestamp::new(99))
            .await
            .unwrap();

        let reopened = JsonWatermarkStore::new(dir.path());
        assert_eq!(
            reopened.get(Category::Chat).await.unwrap(),
            Some(Timestamp::new(99))
        );
    }

    #[tokio::test]
    async fn first_run_until_any_watermark_exists() {
        let dir = tempdir().unwrap();
        let store = JsonWatermarkStore::new(dir.path());
        assert!(store.is_first_run().await.unwrap());

        store.set(Category::CallLog, Timestamp::new(5)).await.unwrap();
        assert!(!store.is_first_run().await.unwrap());
    }

    #[tokio::test]
    async fn all_returns_every_stored_mark() {
        let dir = tempdir().unwrap();
        let store = JsonWatermarkStore::new(dir.path());
        store.set(Category::Sms, Timestamp::new(1)).await.unwrap();
        store.set(Category::Chat, Timestamp::new(2)).await.unwrap();

        let marks = store.all().await.unwrap();
        assert_eq!(marks.len(), 2);
        assert_eq!(marks.get(&Category::Chat), Some(&Timestamp::new(2)));
    }

    #[tokio::test]
    async fn clear_one_category_keeps_the_rest() {
        let dir = tempdir().unwrap();
        let store = JsonWatermarkStore::new(dir.path());
        store.set(Category::Sms, Timestamp::new(1)).await.unwrap();
        store.set(Category::Mms, Timestamp::new(2)).await.unwrap();

        store.clear(Some(Category::Sms)).await.unwrap();

        assert_eq!(store.get(Category::Sms).await.unwrap(), None);
        assert_eq!(store.get(Category::Mms).await.unwrap(), Some(Timestamp::new(2)));
    }

    #[tokio::test]
    async fn clear_all_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = JsonWatermarkStore::new(dir.path());
        store.set(Category::Sms, Timestamp::new(1)).await.unwrap();

        store.clear(None).await.unwrap();

        assert!(!dir.path().join("watermarks.json").exists());
        // Clearing again is fine
        store.clear(None).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_reports_data_access() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("watermarks.json"), "not json")
            .await
            .unwrap();

        let store = JsonWatermarkStore::new(dir.path());
        let err = store.get(Category::Sms).await.unwrap_err();
        assert!(matches!(err, BackupError::DataAccess(_)));
    }
}

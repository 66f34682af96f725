//! Record source backed by a JSON message export.
//!
//! An export directory holds one JSON file per category (`sms.json`,
//! `mms.json`, `calls.json`, `chats.json`), each a flat array of records.
//! Missing files read as empty categories, so partial exports work.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use msgvault_engine::{ItemSource, WatermarkStore};
use msgvault_types::{BackupError, Batch, Category, ContactGroup, Record, Timestamp};

fn export_file(category: Category) -> &'static str {
    match category {
        Category::Sms => "sms.json",
        Category::Mms => "mms.json",
        Category::CallLog => "calls.json",
        Category::Chat => "chats.json",
    }
}

/// Item source reading records from a JSON export directory.
///
/// Fetches consult the watermark store and return only records strictly
/// newer than the category's watermark, oldest first. The contact-group
/// filter matches the record's `contact_group` field.
pub struct JsonExportSource {
    root: PathBuf,
    watermarks: Arc<dyn WatermarkStore>,
}

impl JsonExportSource {
    /// Create a source over an export directory.
    pub fn new(root: PathBuf, watermarks: Arc<dyn WatermarkStore>) -> Self {
        Self { root, watermarks }
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(".msgvault-lock")
    }

    async fn read_category(&self, category: Category) -> Result<Vec<Record>, BackupError> {
        let path = self.root.join(export_file(category));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                BackupError::DataAccess(format!("{}: {}", export_file(category), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(BackupError::DataAccess(format!(
                "{}: {}",
                export_file(category),
                e
            ))),
        }
    }
}

#[async_trait]
impl ItemSource for JsonExportSource {
    async fn acquire(&self) -> Result<(), BackupError> {
        let result = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.lock_path())
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(
                BackupError::DataAccess("another backup holds the export lock".into()),
            ),
            Err(e) => Err(BackupError::DataAccess(format!("export lock: {}", e))),
        }
    }

    fn release(&self) {
        let _ = std::fs::remove_file(self.lock_path());
    }

    async fn fetch(
        &self,
        category: Category,
        group: Option<ContactGroup>,
        max: usize,
    ) -> Result<Batch, BackupError> {
        if max == 0 {
            return Ok(Batch::empty(category));
        }

        let mut records = self.read_category(category).await?;
        let floor = self.watermarks.get(category).await?;
        records.retain(|record| floor.map_or(true, |floor| record.timestamp > floor));
        if let Some(group) = group {
            records.retain(|record| {
                record
                    .field("contact_group")
                    .and_then(|value| value.parse::<i64>().ok())
                    == Some(group.id())
            });
        }
        records.sort_by_key(|record| record.timestamp);
        records.truncate(max);
        Ok(Batch::new(category, records))
    }

    async fn max_timestamp(
        &self,
        category: Category,
    ) -> Result<Option<Timestamp>, BackupError> {
        let records = self.read_category(category).await?;
        Ok(records.iter().map(|record| record.timestamp).max())
    }
}

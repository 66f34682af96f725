//! Local record store access.

use async_trait::async_trait;
use msgvault_types::{BackupError, Batch, Category, ContactGroup, Timestamp};

/// Paginated access to the local record store.
///
/// Fetches return records strictly newer than the category's stored
/// watermark, oldest first. Implementations own the watermark consultation
/// and the group filtering; the engine only passes bounds through.
///
/// The engine takes exclusive access for the duration of batch retrieval and
/// consumption, and releases it on every exit path.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Take exclusive access to the local store for the duration of a run.
    async fn acquire(&self) -> Result<(), BackupError>;

    /// Release the access taken by [`acquire`](ItemSource::acquire).
    ///
    /// Must be callable from a drop guard, so it is synchronous and
    /// infallible.
    fn release(&self);

    /// Fetch up to `max` not-yet-archived records of one category.
    ///
    /// `max` of zero yields an empty batch. Fails with
    /// [`BackupError::DataAccess`] if the local store is unavailable.
    async fn fetch(
        &self,
        category: Category,
        group: Option<ContactGroup>,
        max: usize,
    ) -> Result<Batch, BackupError>;

    /// Newest record timestamp available for one category, if any.
    ///
    /// Skip runs advance watermarks to this value.
    async fn max_timestamp(&self, category: Category)
        -> Result<Option<Timestamp>, BackupError>;
}

//! Record-to-message conversion.

use async_trait::async_trait;
use msgvault_core::Chunk;
use msgvault_types::{BackupError, Conversion};

/// Transforms chunks of raw records into transport messages.
///
/// Returning fewer messages than records, or none at all, is allowed; the
/// malformed-record policy (skip and continue, or fail the chunk with
/// [`BackupError::DataAccess`]) is the implementation's choice. The
/// conversion's max timestamp covers only the records actually converted.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert one chunk of records.
    async fn convert(&self, chunk: &Chunk) -> Result<Conversion, BackupError>;
}

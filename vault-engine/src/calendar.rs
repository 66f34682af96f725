//! Optional calendar mirroring of call log entries.

use async_trait::async_trait;
use msgvault_types::{BackupError, Conversion};

/// Mirrors call-log conversions into a calendar.
///
/// Configured per engine, invoked only for call-log chunks after their
/// append succeeds. Failures are logged by the engine and never fail the
/// run.
#[async_trait]
pub trait CalendarMirror: Send + Sync {
    /// Mirror one call-log conversion.
    async fn mirror(&self, conversion: &Conversion) -> Result<(), BackupError>;
}

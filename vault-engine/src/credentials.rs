//! Remote credential presence and refresh.

use async_trait::async_trait;

/// Reports whether remote credentials exist and performs the one-shot
/// refresh used when the remote signals token expiry.
///
/// Credential storage itself is outside the engine; this trait only answers
/// the two questions the run lifecycle asks.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether any remote credentials are configured at all.
    fn is_configured(&self) -> bool;

    /// Attempt to refresh expired credentials.
    ///
    /// Returns whether the refresh produced usable credentials. Called at
    /// most once per run.
    async fn refresh(&self) -> bool;
}

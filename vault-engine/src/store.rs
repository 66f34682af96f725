//! Remote mail store access.
//!
//! Three layers mirror how mail stores behave: a [`MailStore`] mints
//! authenticated [`MailSession`]s, a session opens one [`RemoteFolder`] per
//! category group, and folders accept appends until closed.
//!
//! Authentication parameters on a session are fixed when it is opened, so
//! the engine opens a fresh session for every attempt; the
//! credential-refresh retry in particular must never reuse a session minted
//! with stale tokens.

use async_trait::async_trait;
use msgvault_types::{BackupError, FolderGroup, MailMessage};

/// Factory for per-attempt store sessions.
#[async_trait]
pub trait MailStore: Send + Sync {
    /// Open a fresh session against the remote store.
    async fn open_session(&self) -> Result<Box<dyn MailSession>, BackupError>;
}

/// One authenticated store session.
#[async_trait]
pub trait MailSession: Send + Sync {
    /// Open the append-only folder backing one category group.
    async fn open_folder(
        &self,
        group: FolderGroup,
    ) -> Result<Box<dyn RemoteFolder>, BackupError>;
}

/// Append-only sink for transport messages.
#[async_trait]
pub trait RemoteFolder: Send {
    /// Append messages to the folder.
    ///
    /// Fails with the transport, authentication, or protocol classifications
    /// of [`BackupError`].
    async fn append(&mut self, messages: &[MailMessage]) -> Result<(), BackupError>;

    /// Close the folder. The engine calls this exactly once on every exit
    /// path; close failures are logged, never propagated.
    async fn close(&mut self) -> Result<(), BackupError>;
}

//! Error classification for backup runs.

use thiserror::Error;

/// Classified failure causes for a backup run.
///
/// Payloads are plain strings so the error can be cloned into state
/// snapshots. Cancellation is deliberately not a variant: it is a normal
/// terminal outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackupError {
    /// No remote credentials are configured at all
    #[error("no remote credentials configured")]
    MissingCredentials,

    /// The remote rejected the session with a "token expired" signal;
    /// retryable once after a credential refresh
    #[error("credentials expired: {0}")]
    CredentialsExpired(String),

    /// Credentials rejected outright, not merely expired
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Transport-level connection failure
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// Any other remote-protocol failure
    #[error("remote protocol error: {0}")]
    Protocol(String),

    /// Local store or conversion failure
    #[error("local data access failed: {0}")]
    DataAccess(String),
}

impl BackupError {
    /// Whether this failure may be resolved by the one-shot credential
    /// refresh retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackupError::CredentialsExpired(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BackupError::CredentialsExpired("status 400".into());
        assert_eq!(err.to_string(), "credentials expired: status 400");
        assert_eq!(
            BackupError::MissingCredentials.to_string(),
            "no remote credentials configured"
        );
    }

    #[test]
    fn only_expiry_is_retryable() {
        assert!(BackupError::CredentialsExpired("x".into()).is_retryable());
        assert!(!BackupError::MissingCredentials.is_retryable());
        assert!(!BackupError::AuthenticationRejected("x".into()).is_retryable());
        assert!(!BackupError::Connectivity("x".into()).is_retryable());
        assert!(!BackupError::Protocol("x".into()).is_retryable());
        assert!(!BackupError::DataAccess("x".into()).is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackupError>();
    }

    #[test]
    fn error_is_cloneable_into_snapshots() {
        let err = BackupError::Connectivity("reset".into());
        assert_eq!(err.clone(), err);
    }
}

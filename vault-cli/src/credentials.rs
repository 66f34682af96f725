//! Credentials sourced from the stored profile.

use async_trait::async_trait;

use msgvault_engine::CredentialProvider;

/// Credential provider over the profile's access token.
///
/// The token is fixed for the lifetime of the process, so a refresh cannot
/// produce a new one; expired tokens require `msgvault init` with a fresh
/// token.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    /// Create a provider over a stored token. An empty token means no
    /// credentials are configured.
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }

    async fn refresh(&self) -> bool {
        false
    }
}

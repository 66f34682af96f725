//! Configuration management for msgvault.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archive profile stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Account the archive belongs to (shown in status output).
    pub account: String,
    /// Directory the mail archive is written into.
    pub archive_dir: PathBuf,
    /// Remote access token; empty means no credentials configured.
    pub token: String,
    /// When the profile was created.
    pub created_at: u64,
}

impl ProfileConfig {
    /// Create a new profile configuration.
    pub fn new(account: &str, archive_dir: PathBuf, token: &str) -> Self {
        Self {
            account: account.to_string(),
            archive_dir,
            token: token.to_string(),
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        }
    }

    /// Load the profile from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("profile.json");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Profile not initialized. Run 'msgvault init' first.")?;
        serde_json::from_str(&contents).context("Invalid profile configuration")
    }

    /// Save the profile to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("profile.json");
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save profile configuration")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if a profile exists.
    pub async fn exists(data_dir: &Path) -> bool {
        data_dir.join("profile.json").exists()
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

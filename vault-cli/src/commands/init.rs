//! Initialize an archive profile.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::ProfileConfig;

/// Run the init command.
pub async fn run(
    data_dir: &Path,
    account: &str,
    archive_dir: Option<PathBuf>,
    token: Option<String>,
) -> Result<()> {
    // Check if already initialized
    if ProfileConfig::exists(data_dir).await {
        anyhow::bail!(
            "Profile already initialized. Delete {} to reinitialize.",
            data_dir.join("profile.json").display()
        );
    }

    let archive_dir = archive_dir.unwrap_or_else(|| data_dir.join("archive"));
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("Access token (leave empty for none): ")
            .context("Failed to read access token")?,
    };

    let config = ProfileConfig::new(account, archive_dir, &token);
    config.save(data_dir).await?;

    println!("Profile initialized successfully!");
    println!();
    println!("  Account:     {}", config.account);
    println!("  Archive dir: {}", config.archive_dir.display());
    println!("  Data dir:    {}", data_dir.display());
    if config.token.is_empty() {
        println!();
        println!("No access token stored; backups will refuse to run until one");
        println!("is configured.");
    }
    println!();
    println!("Next steps:");
    println!("  1. Archive an export: msgvault backup --export <dir>");
    println!("  2. Check progress anytime: msgvault status");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_creates_a_profile() {
        let dir = tempdir().unwrap();
        run(dir.path(), "me@example.org", None, Some("tok".into()))
            .await
            .unwrap();

        assert!(dir.path().join("profile.json").exists());

        let config = ProfileConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.account, "me@example.org");
        assert_eq!(config.archive_dir, dir.path().join("archive"));
        assert_eq!(config.token, "tok");
    }

    #[tokio::test]
    async fn init_fails_if_already_initialized() {
        let dir = tempdir().unwrap();

        run(dir.path(), "first@example.org", None, Some("a".into()))
            .await
            .unwrap();

        let result = run(dir.path(), "second@example.org", None, Some("b".into())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn init_honors_a_custom_archive_dir() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("elsewhere");
        run(
            dir.path(),
            "me@example.org",
            Some(custom.clone()),
            Some("tok".into()),
        )
        .await
        .unwrap();

        let config = ProfileConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.archive_dir, custom);
    }
}

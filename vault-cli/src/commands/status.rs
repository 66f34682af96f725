//! Show profile, watermark, and archive status.

use anyhow::{Context, Result};
use std::path::Path;

use msgvault_types::{Category, FolderGroup};

use crate::config::ProfileConfig;
use crate::watermarks::JsonWatermarkStore;

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let profile = ProfileConfig::load(data_dir).await?;
    let store = JsonWatermarkStore::new(data_dir);

    println!("Profile");
    println!("  Account:     {}", profile.account);
    println!("  Archive dir: {}", profile.archive_dir.display());
    println!(
        "  Credentials: {}",
        if profile.token.is_empty() { "not configured" } else { "configured" }
    );
    println!();

    println!("Watermarks (epoch millis)");
    let marks = store.all().await?;
    for category in Category::IN_PRIORITY_ORDER {
        match marks.get(&category) {
            Some(timestamp) => println!("  {:<9} {}", category, timestamp),
            None => println!("  {:<9} never archived", category),
        }
    }
    println!();

    println!("Archive");
    for group in [FolderGroup::Messages, FolderGroup::Calls, FolderGroup::Chats] {
        let count = count_messages(&profile.archive_dir, group).await?;
        println!("  {:<9} {} message(s)", group.folder_name(), count);
    }

    Ok(())
}

async fn count_messages(root: &Path, group: FolderGroup) -> Result<usize> {
    let dir = root.join(group.folder_name());
    if !dir.exists() {
        return Ok(0);
    }
    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .context("Failed to read archive directory")?;
    let mut count = 0;
    while entries.next_entry().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

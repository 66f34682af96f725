//! Clear watermarks so records are archived again.

use anyhow::Result;
use std::path::Path;

use msgvault_types::Category;

use crate::config::ProfileConfig;
use crate::watermarks::JsonWatermarkStore;

/// Run the reset command.
pub async fn run(data_dir: &Path, category: Option<&str>) -> Result<()> {
    if !ProfileConfig::exists(data_dir).await {
        anyhow::bail!("Profile not initialized. Run 'msgvault init' first.");
    }

    let store = JsonWatermarkStore::new(data_dir);
    match category {
        Some(name) => {
            let category = parse_category(name)?;
            store.clear(Some(category)).await?;
            println!("Cleared the {} watermark.", category);
            println!("The next backup re-archives every {} record.", category);
        }
        None => {
            store.clear(None).await?;
            println!("Cleared all watermarks.");
            println!("The next backup re-archives every record.");
        }
    }

    Ok(())
}

fn parse_category(name: &str) -> Result<Category> {
    match name {
        "sms" => Ok(Category::Sms),
        "mms" => Ok(Category::Mms),
        "calls" | "call-log" => Ok(Category::CallLog),
        "chats" | "chat" => Ok(Category::Chat),
        other => anyhow::bail!(
            "Unknown category '{}'. Use sms, mms, calls, or chats.",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgvault_engine::WatermarkStore;
    use msgvault_types::Timestamp;
    use tempfile::tempdir;

    async fn setup(data_dir: &Path) -> JsonWatermarkStore {
        ProfileConfig::new("me@example.org", data_dir.join("archive"), "tok")
            .save(data_dir)
            .await
            .unwrap();
        let store = JsonWatermarkStore::new(data_dir);
        store.set(Category::Sms, Timestamp::new(1)).await.unwrap();
        store.set(Category::Chat, Timestamp::new(2)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn reset_requires_a_profile() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn reset_one_category() {
        let dir = tempdir().unwrap();
        let store = setup(dir.path()).await;

        run(dir.path(), Some("sms")).await.unwrap();

        assert_eq!(store.get(Category::Sms).await.unwrap(), None);
        assert_eq!(store.get(Category::Chat).await.unwrap(), Some(Timestamp::new(2)));
    }

    #[tokio::test]
    async fn reset_everything() {
        let dir = tempdir().unwrap();
        let store = setup(dir.path()).await;

        run(dir.path(), None).await.unwrap();

        assert_eq!(store.get(Category::Sms).await.unwrap(), None);
        assert_eq!(store.get(Category::Chat).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let dir = tempdir().unwrap();
        setup(dir.path()).await;

        let err = run(dir.path(), Some("faxes")).await.unwrap_err();
        assert!(err.to_string().contains("Unknown category"));
    }

    #[test]
    fn category_names_parse() {
        assert_eq!(parse_category("sms").unwrap(), Category::Sms);
        assert_eq!(parse_category("mms").unwrap(), Category::Mms);
        assert_eq!(parse_category("calls").unwrap(), Category::CallLog);
        assert_eq!(parse_category("call-log").unwrap(), Category::CallLog);
        assert_eq!(parse_category("chats").unwrap(), Category::Chat);
        assert!(parse_category("email").is_err());
    }
}

//! Mail store backed by a local maildir-style directory tree.

use async_trait::async_trait;
use std::path::PathBuf;

use msgvault_engine::{MailSession, MailStore, RemoteFolder};
use msgvault_types::{BackupError, FolderGroup, MailMessage};

/// Mail store writing one file per message under a per-group directory.
///
/// Messages land in `<root>/<group>/<millis>.<id>.eml`. Directories are
/// created on demand, so pointing the store at an empty directory works.
#[derive(Debug, Clone)]
pub struct MaildirStore {
    root: PathBuf,
}

impl MaildirStore {
    /// Create a store rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl MailStore for MaildirStore {
    async fn open_session(&self) -> Result<Box<dyn MailSession>, BackupError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(archive_error)?;
        Ok(Box::new(MaildirSession { root: self.root.clone() }))
    }
}

struct MaildirSession {
    root: PathBuf,
}

#[async_trait]
impl MailSession for MaildirSession {
    async fn open_folder(
        &self,
        group: FolderGroup,
    ) -> Result<Box<dyn RemoteFolder>, BackupError> {
        let dir = self.root.join(group.folder_name());
        tokio::fs::create_dir_all(&dir).await.map_err(archive_error)?;
        Ok(Box::new(MaildirFolder { dir }))
    }
}

struct MaildirFolder {
    dir: PathBuf,
}

#[async_trait]
impl RemoteFolder for MaildirFolder {
    async fn append(&mut self, messages: &[MailMessage]) -> Result<(), BackupError> {
        for message in messages {
            let name = format!(
                "{}.{}.eml",
                message.date.millis(),
                message.id.as_uuid().simple()
            );
            tokio::fs::write(self.dir.join(name), &message.raw)
                .await
                .map_err(archive_error)?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackupError> {
        // Files are written through; nothing to flush.
        Ok(())
    }
}

fn archive_error(error: std::io::Error) -> BackupError {
    BackupError::Protocol(format!("archive write failed: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgvault_types::Timestamp;
    use tempfile::tempdir;

    #[tokio::test]
    async fn appends_one_file_per_message() {
        let dir = tempdir().unwrap();
        let store = MaildirStore::new(dir.path().join("archive"));

        let session = store.open_session().await.unwrap();
        let mut folder = session.open_folder(FolderGroup::Messages).await.unwrap();
        folder
            .append(&[
                MailMessage::new(Timestamp::new(10), b"first".to_vec()),
                MailMessage::new(Timestamp::new(20), b"second".to_vec()),
            ])
            .await
            .unwrap();
        folder.close().await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path().join("archive/messages"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|name| name.starts_with("10.")));
        assert!(files.iter().all(|name| name.ends_with(".eml")));
    }

    #[tokio::test]
    async fn folders_map_to_group_directories() {
        let dir = tempdir().unwrap();
        let store = MaildirStore::new(dir.path().to_path_buf());

        let session = store.open_session().await.unwrap();
        session.open_folder(FolderGroup::Calls).await.unwrap();
        session.open_folder(FolderGroup::Chats).await.unwrap();

        assert!(dir.path().join("calls").is_dir());
        assert!(dir.path().join("chats").is_dir());
    }

    #[tokio::test]
    async fn message_content_survives_the_append() {
        let dir = tempdir().unwrap();
        let store = MaildirStore::new(dir.path().to_path_buf());
        let message = MailMessage::new(Timestamp::new(42), b"From: x\r\n\r\nhello".to_vec());
        let name = format!("42.{}.eml", message.id.as_uuid().simple());

        let session = store.open_session().await.unwrap();
        let mut folder = session.open_folder(FolderGroup::Messages).await.unwrap();
        folder.append(&[message]).await.unwrap();

        let stored = std::fs::read(dir.path().join("messages").join(name)).unwrap();
        assert_eq!(stored, b"From: x\r\n\r\nhello");
    }
}

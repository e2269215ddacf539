//! Spool-directory mailbox.
//!
//! Layout: `<root>/<routing-address>/<attachment-file>`. An external fetcher
//! drops attachments into the address directory; marking an item processed
//! moves its file into a `.processed/` subdirectory so it never lists again.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use crate::{MailError, MailItem, MailSource, Result};

const PROCESSED_DIR: &str = ".processed";

#[derive(Debug, Clone)]
pub struct DropDirMailbox {
    root: PathBuf,
}

impl DropDirMailbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an item id ("address/filename") to its on-disk path,
    /// rejecting anything that escapes the spool root.
    fn item_path(&self, item_id: &str) -> Result<PathBuf> {
        let rel = Path::new(item_id);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || rel.components().count() != 2 {
            return Err(MailError::NotFound(item_id.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl MailSource for DropDirMailbox {
    async fn list_unread(&self) -> Result<Vec<MailItem>> {
        let mut items = Vec::new();

        if !fs::try_exists(&self.root).await? {
            return Ok(items);
        }

        let mut addresses = fs::read_dir(&self.root).await?;
        while let Some(address_entry) = addresses.next_entry().await? {
            if !address_entry.file_type().await?.is_dir() {
                continue;
            }
            let recipient = address_entry.file_name().to_string_lossy().to_string();
            if recipient.starts_with('.') {
                continue;
            }

            let mut files = fs::read_dir(address_entry.path()).await?;
            while let Some(file_entry) = files.next_entry().await? {
                if !file_entry.file_type().await?.is_file() {
                    continue;
                }
                let filename = file_entry.file_name().to_string_lossy().to_string();
                if filename.starts_with('.') {
                    continue;
                }

                let received_at: DateTime<Utc> = file_entry
                    .metadata()
                    .await?
                    .modified()
                    .map(DateTime::from)
                    .unwrap_or_else(|_| Utc::now());

                items.push(MailItem {
                    id: format!("{recipient}/{filename}"),
                    recipient: recipient.clone(),
                    sender: None,
                    subject: Some(filename.clone()),
                    received_at,
                    attachments: vec![filename],
                });
            }
        }

        items.sort_by(|a, b| a.received_at.cmp(&b.received_at).then(a.id.cmp(&b.id)));
        debug!(count = items.len(), "listed unread drop-dir items");
        Ok(items)
    }

    async fn fetch_attachment(&self, item_id: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.item_path(item_id)?;
        if path.file_name().map(|f| f.to_string_lossy() != name).unwrap_or(true) {
            return Err(MailError::NotFound(format!("{item_id}:{name}")));
        }

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(MailError::NotFound(item_id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn mark_processed(&self, item_id: &str) -> Result<()> {
        let path = self.item_path(item_id)?;
        if !fs::try_exists(&path).await? {
            return Err(MailError::NotFound(item_id.to_string()));
        }

        let parent = path
            .parent()
            .ok_or_else(|| MailError::NotFound(item_id.to_string()))?;
        let done_dir = parent.join(PROCESSED_DIR);
        fs::create_dir_all(&done_dir).await?;

        let filename = path
            .file_name()
            .ok_or_else(|| MailError::NotFound(item_id.to_string()))?;
        fs::rename(&path, done_dir.join(filename)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn drop_file(root: &Path, address: &str, name: &str, bytes: &[u8]) {
        let dir = root.join(address);
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join(name), bytes).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_fetch_mark_cycle() {
        let tmp = TempDir::new().unwrap();
        let mailbox = DropDirMailbox::new(tmp.path());
        drop_file(tmp.path(), "reports@hv.example", "fc_1731283200.tsv", b"data").await;

        let items = mailbox.list_unread().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].recipient, "reports@hv.example");
        assert_eq!(items[0].attachments, vec!["fc_1731283200.tsv"]);

        let bytes = mailbox
            .fetch_attachment(&items[0].id, "fc_1731283200.tsv")
            .await
            .unwrap();
        assert_eq!(bytes, b"data");

        mailbox.mark_processed(&items[0].id).await.unwrap();
        assert!(mailbox.list_unread().await.unwrap().is_empty());

        // The original bytes survive in the processed area.
        let moved = tmp
            .path()
            .join("reports@hv.example")
            .join(PROCESSED_DIR)
            .join("fc_1731283200.tsv");
        assert!(moved.exists());
    }

    #[tokio::test]
    async fn test_hidden_files_and_dirs_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let mailbox = DropDirMailbox::new(tmp.path());
        drop_file(tmp.path(), "reports@hv.example", ".partial-download", b"x").await;
        drop_file(tmp.path(), ".tmp", "leftover.tsv", b"x").await;

        assert!(mailbox.list_unread().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_lists_empty() {
        let tmp = TempDir::new().unwrap();
        let mailbox = DropDirMailbox::new(tmp.path().join("never-created"));
        assert!(mailbox.list_unread().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_ids_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let mailbox = DropDirMailbox::new(tmp.path());

        let err = mailbox
            .fetch_attachment("../outside/x.tsv", "x.tsv")
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::NotFound(_)));

        let err = mailbox.mark_processed("only-one-component").await.unwrap_err();
        assert!(matches!(err, MailError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_processed_twice_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let mailbox = DropDirMailbox::new(tmp.path());
        drop_file(tmp.path(), "a@b", "f.tsv", b"x").await;

        mailbox.mark_processed("a@b/f.tsv").await.unwrap();
        let err = mailbox.mark_processed("a@b/f.tsv").await.unwrap_err();
        assert!(matches!(err, MailError::NotFound(_)));
    }
}

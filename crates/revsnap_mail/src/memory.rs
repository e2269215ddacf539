//! In-memory mailbox for tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{MailError, MailItem, MailSource, Result};

#[derive(Debug, Default)]
struct Inner {
    items: Vec<MailItem>,
    attachments: HashMap<(String, String), Vec<u8>>,
    processed: HashSet<String>,
}

/// Scriptable mailbox holding items and attachment bytes in memory.
#[derive(Debug, Default)]
pub struct MemoryMailbox {
    inner: Mutex<Inner>,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an item along with its attachment payloads.
    pub async fn push(&self, item: MailItem, payloads: Vec<(&str, &[u8])>) {
        let mut inner = self.inner.lock().await;
        for (name, bytes) in payloads {
            inner
                .attachments
                .insert((item.id.clone(), name.to_string()), bytes.to_vec());
        }
        inner.items.push(item);
    }

    /// Convenience for the common one-attachment case.
    pub async fn push_simple(
        &self,
        message_id: &str,
        recipient: &str,
        filename: &str,
        bytes: &[u8],
        received_at: DateTime<Utc>,
    ) {
        self.push(
            MailItem {
                id: message_id.to_string(),
                recipient: recipient.to_string(),
                sender: Some("fetcher@local".to_string()),
                subject: Some(filename.to_string()),
                received_at,
                attachments: vec![filename.to_string()],
            },
            vec![(filename, bytes)],
        )
        .await;
    }

    pub async fn processed_ids(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut ids: Vec<String> = inner.processed.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl MailSource for MemoryMailbox {
    async fn list_unread(&self) -> Result<Vec<MailItem>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .items
            .iter()
            .filter(|item| !inner.processed.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn fetch_attachment(&self, item_id: &str, name: &str) -> Result<Vec<u8>> {
        let inner = self.inner.lock().await;
        inner
            .attachments
            .get(&(item_id.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| MailError::NotFound(format!("{item_id}:{name}")))
    }

    async fn mark_processed(&self, item_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.items.iter().any(|item| item.id == item_id) {
            return Err(MailError::NotFound(item_id.to_string()));
        }
        inner.processed.insert(item_id.to_string());
        Ok(())
    }
}

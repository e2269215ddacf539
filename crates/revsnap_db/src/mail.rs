//! Processed mail audit log operations.

use crate::error::{is_unique_violation, DbError, Result};
use crate::RevsnapDb;
use chrono::{DateTime, Utc};
use revsnap_core::ProcessedMail;
use sqlx::Row;

impl RevsnapDb {
    /// Whether a message id has already been fully processed.
    ///
    /// Errors propagate so the dedup gate stays fail-closed.
    pub async fn mail_is_processed(&self, message_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM rs_processed_mail WHERE message_id = ? LIMIT 1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Record a fully handled mail item.
    pub async fn mail_mark_processed(
        &self,
        message_id: &str,
        sender: Option<&str>,
        subject: Option<&str>,
        received_at: Option<DateTime<Utc>>,
        content_hash: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO rs_processed_mail (message_id, sender, subject, received_at, processed_at, content_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message_id)
        .bind(sender)
        .bind(subject)
        .bind(received_at.map(|t| t.timestamp_millis()))
        .bind(Self::now_millis())
        .bind(content_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::constraint(format!("message already recorded: {message_id}"))
            } else {
                e.into()
            }
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Most recently processed mail items, newest first.
    pub async fn mail_recent(&self, limit: usize) -> Result<Vec<ProcessedMail>> {
        let rows = sqlx::query(
            "SELECT * FROM rs_processed_mail ORDER BY processed_at DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_processed_mail).collect())
    }
}

fn row_to_processed_mail(row: &sqlx::sqlite::SqliteRow) -> ProcessedMail {
    ProcessedMail {
        id: row.get("id"),
        message_id: row.get("message_id"),
        sender: row.get("sender"),
        subject: row.get("subject"),
        received_at: row
            .get::<Option<i64>, _>("received_at")
            .map(RevsnapDb::millis_to_datetime),
        processed_at: RevsnapDb::millis_to_datetime(row.get("processed_at")),
        content_hash: row.get("content_hash"),
    }
}

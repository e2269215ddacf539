//! The ingestion cycle: drain unread mail into snapshots.
//!
//! One cycle lists unread items, routes each to a hotel by recipient
//! address, ingests every attachment, and marks the item handled in the
//! audit log first and the mailbox second. A crash between the two writes
//! leaves the mailbox copy unread; the next cycle heals it from the audit
//! log without reprocessing. Item failures are isolated: they are recorded
//! in the summary and the item stays unread for the next cycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use revsnap_core::{sha256_hex, CycleSummary};
use revsnap_db::RevsnapDb;
use revsnap_mail::{MailItem, MailSource};
use revsnap_storage::BlobStore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::attachment::{ingest_attachment, IngestOutcome};
use crate::error::Result;
use crate::seed::apply_seed_overlay;

enum ItemOutcome {
    Processed { snapshots: usize },
    Skipped { reason: SkipReason },
}

enum SkipReason {
    AlreadyProcessed,
    UnknownRecipient,
    InactiveHotel,
    DuplicateContent,
    NoAttachments,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AlreadyProcessed => "already processed",
            SkipReason::UnknownRecipient => "unknown recipient",
            SkipReason::InactiveHotel => "inactive hotel",
            SkipReason::DuplicateContent => "duplicate content",
            SkipReason::NoAttachments => "no attachments",
        };
        f.write_str(s)
    }
}

/// Drives cycles against one mailbox, one blob store, and one registry.
pub struct Orchestrator<M, B> {
    db: RevsnapDb,
    mailbox: M,
    blobs: B,
    cycle_active: AtomicBool,
}

/// Resets the single-flight flag even when a cycle unwinds early.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<M: MailSource, B: BlobStore> Orchestrator<M, B> {
    pub fn new(db: RevsnapDb, mailbox: M, blobs: B) -> Self {
        Self {
            db,
            mailbox,
            blobs,
            cycle_active: AtomicBool::new(false),
        }
    }

    pub fn mailbox(&self) -> &M {
        &self.mailbox
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Run one ingestion cycle, unless one is already in flight.
    ///
    /// Returns `None` when the run was skipped because a previous cycle is
    /// still active. Overlapping timer ticks and manual runs collapse into
    /// a single pass this way.
    pub async fn run_cycle(&self) -> Option<CycleSummary> {
        if self
            .cycle_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("ingestion cycle already in flight; skipping this run");
            return None;
        }
        let _guard = CycleGuard(&self.cycle_active);

        Some(self.run_cycle_inner().await)
    }

    async fn run_cycle_inner(&self) -> CycleSummary {
        let mut summary = CycleSummary::new(Uuid::new_v4().to_string());
        info!(run_id = %summary.run_id, "ingestion cycle started");

        let items = match self.mailbox.list_unread().await {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "could not list unread mail");
                summary.record_error(format!("list unread: {err}"));
                return summary;
            }
        };

        for item in items {
            summary.items_seen += 1;
            match self.process_item(&item, &mut summary).await {
                Ok(ItemOutcome::Processed { snapshots }) => {
                    summary.processed += 1;
                    info!(item = %item.id, snapshots, "mail item processed");
                }
                Ok(ItemOutcome::Skipped { reason }) => {
                    summary.skipped += 1;
                    info!(item = %item.id, %reason, "mail item skipped");
                }
                Err(err) => {
                    error!(item = %item.id, error = %err, "mail item failed; will retry next cycle");
                    summary.record_error(format!("{}: {err}", item.id));
                }
            }
        }

        info!(
            run_id = %summary.run_id,
            items = summary.items_seen,
            processed = summary.processed,
            skipped = summary.skipped,
            snapshots = summary.snapshots_created,
            errors = summary.error_count,
            "ingestion cycle finished"
        );
        summary
    }

    async fn process_item(
        &self,
        item: &MailItem,
        summary: &mut CycleSummary,
    ) -> Result<ItemOutcome> {
        if self.db.mail_is_processed(&item.id).await? {
            // Crash after the audit write can leave the mailbox copy unread.
            if let Err(err) = self.mailbox.mark_processed(&item.id).await {
                warn!(item = %item.id, error = %err, "could not re-mark handled item in mailbox");
            }
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::AlreadyProcessed,
            });
        }

        let Some(hotel) = self.db.hotel_get_by_email(&item.recipient).await? else {
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::UnknownRecipient,
            });
        };
        if !hotel.active {
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::InactiveHotel,
            });
        }

        if item.attachments.is_empty() {
            self.complete_item(item, sha256_hex(&[])).await?;
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::NoAttachments,
            });
        }

        let mut first_hash: Option<String> = None;
        let mut committed = 0usize;

        for name in &item.attachments {
            let bytes = self.mailbox.fetch_attachment(&item.id, name).await?;
            if first_hash.is_none() {
                first_hash = Some(sha256_hex(&bytes));
            }

            let outcome = ingest_attachment(
                &self.db,
                &self.blobs,
                &hotel,
                name,
                &bytes,
                item.received_at,
                false,
            )
            .await?;

            match outcome {
                IngestOutcome::Committed { rows, .. } => {
                    committed += 1;
                    summary.snapshots_created += 1;
                    apply_seed_overlay(&self.db, hotel.id, &rows).await;
                }
                IngestOutcome::Duplicate { content_hash } => {
                    debug!(
                        item = %item.id,
                        attachment = %name,
                        content_hash = %content_hash,
                        "attachment already ingested"
                    );
                }
            }
        }

        self.complete_item(item, first_hash.unwrap_or_else(|| sha256_hex(&[])))
            .await?;

        if committed == 0 {
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::DuplicateContent,
            });
        }
        Ok(ItemOutcome::Processed {
            snapshots: committed,
        })
    }

    /// Audit log first, mailbox second. The heal path above relies on this
    /// write order.
    async fn complete_item(&self, item: &MailItem, content_hash: String) -> Result<()> {
        self.db
            .mail_mark_processed(
                &item.id,
                item.sender.as_deref(),
                item.subject.as_deref(),
                Some(item.received_at),
                &content_hash,
            )
            .await?;
        self.mailbox.mark_processed(&item.id).await?;
        Ok(())
    }
}

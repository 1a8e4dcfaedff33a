//! SweepExpiredQuotesHandler - lapses submitted quotes past their window.
//!
//! Only `submitted` quotes are touched. Each quote is expired with a
//! conditional update on `submitted`, so a quote that the decision
//! orchestrator moved in the meantime is skipped, never overwritten.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::audit::AuditEntry;
use crate::domain::foundation::{ErrorCode, QuoteStatus, Timestamp};
use crate::domain::quote::{QuoteError, QuoteTransition};
use crate::ports::{AuditLog, QuoteRepository};

use super::audit::record_best_effort;

/// Counts from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Quotes moved to `expired` by this pass.
    pub expired: usize,
    /// Candidates another writer got to first.
    pub skipped: usize,
    /// True if shutdown was signalled before every candidate was visited.
    pub interrupted: bool,
}

/// Expiration sweeper.
pub struct SweepExpiredQuotesHandler {
    repository: Arc<dyn QuoteRepository>,
    audit_log: Arc<dyn AuditLog>,
}

impl SweepExpiredQuotesHandler {
    pub fn new(repository: Arc<dyn QuoteRepository>, audit_log: Arc<dyn AuditLog>) -> Self {
        Self {
            repository,
            audit_log,
        }
    }

    /// Expire every submitted quote whose window closed before `now`.
    ///
    /// Returns the number of quotes expired by this call. Running it twice
    /// with the same `now` expires nothing the second time.
    pub async fn sweep_expired(&self, now: Timestamp) -> Result<usize, QuoteError> {
        self.sweep(now, None).await.map(|report| report.expired)
    }

    /// Sweep, checking `shutdown` between quotes.
    ///
    /// # Errors
    ///
    /// `Repository` if listing candidates or a write fails for a reason
    /// other than a lost race. Quotes already expired stay expired.
    pub async fn sweep(
        &self,
        now: Timestamp,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<SweepReport, QuoteError> {
        let candidates = self.repository.list_submitted_expired_before(&now).await?;
        let mut report = SweepReport::default();

        if candidates.is_empty() {
            return Ok(report);
        }

        tracing::debug!(candidates = candidates.len(), "Sweeping expired quotes");

        for quote in candidates {
            if shutdown.map_or(false, |rx| *rx.borrow()) {
                report.interrupted = true;
                break;
            }

            // Adapters may filter coarsely; the aggregate has the final word.
            if !quote.is_expired_at(&now) {
                continue;
            }

            let quote_id = *quote.id();
            let transition = QuoteTransition::expired(now);
            match self
                .repository
                .update_status(&quote_id, &transition, Some(QuoteStatus::Submitted))
                .await
            {
                Ok(_) => {
                    report.expired += 1;
                    let entry = AuditEntry::expiration(quote_id, QuoteStatus::Submitted, now);
                    record_best_effort(self.audit_log.as_ref(), &entry).await;
                    tracing::debug!(quote_id = %quote_id, "Quote expired");
                }
                Err(e)
                    if matches!(
                        e.code,
                        ErrorCode::ConcurrentModification
                            | ErrorCode::QuoteNotFound
                            | ErrorCode::InvalidStateTransition
                    ) =>
                {
                    report.skipped += 1;
                    tracing::debug!(
                        quote_id = %quote_id,
                        error = %e,
                        "Skipping quote changed during sweep"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        quote_id = %quote_id,
                        expired_so_far = report.expired,
                        error = %e,
                        "Failed to expire quote"
                    );
                    return Err(QuoteError::from_repository(quote_id, QuoteStatus::Submitted, e));
                }
            }
        }

        if report.expired > 0 || report.skipped > 0 {
            tracing::info!(
                expired = report.expired,
                skipped = report.skipped,
                interrupted = report.interrupted,
                "Expiration sweep finished"
            );
        }

        Ok(report)
    }
}

//! PostgreSQL implementation of AuditLog.
//!
//! Appends entries to `quote_audit_entries`. The decision snapshot is stored
//! as JSONB so the full validation and risk breakdown survives schema
//! changes in the scorer.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::audit::{AuditEntry, AuditOutcome, AuditSource};
use crate::ports::{AuditLog, AuditLogError};

use super::quote_repository::{is_unique_violation, quote_status_to_str};

/// PostgreSQL implementation of AuditLog.
#[derive(Clone)]
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    /// Creates a new PostgresAuditLog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogError> {
        let snapshot = entry
            .snapshot()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AuditLogError::SerializationFailed {
                id: *entry.id(),
                reason: e.to_string(),
            })?;

        sqlx::query(
            r#"
            INSERT INTO quote_audit_entries (
                id, quote_id, source, outcome, prior_status, new_status, snapshot, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.quote_id().as_uuid())
        .bind(source_to_str(entry.source()))
        .bind(outcome_to_str(entry.outcome()))
        .bind(quote_status_to_str(entry.prior_status()))
        .bind(quote_status_to_str(entry.new_status()))
        .bind(snapshot)
        .bind(entry.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuditLogError::Duplicate(*entry.id())
            } else {
                AuditLogError::Unavailable(e.to_string())
            }
        })?;

        Ok(())
    }
}

fn source_to_str(source: AuditSource) -> &'static str {
    match source {
        AuditSource::Decision => "decision",
        AuditSource::Expiration => "expiration",
    }
}

fn outcome_to_str(outcome: AuditOutcome) -> &'static str {
    match outcome {
        AuditOutcome::Committed => "committed",
        AuditOutcome::Conflict => "conflict",
        AuditOutcome::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_strings_match_serde_names() {
        for source in [AuditSource::Decision, AuditSource::Expiration] {
            assert_eq!(serde_json::to_value(source).unwrap(), source_to_str(source));
        }
        for outcome in [AuditOutcome::Committed, AuditOutcome::Conflict, AuditOutcome::Failed] {
            assert_eq!(serde_json::to_value(outcome).unwrap(), outcome_to_str(outcome));
        }
    }
}

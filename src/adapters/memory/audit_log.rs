//! In-memory audit log.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::audit::AuditEntry;
use crate::domain::foundation::QuoteId;
use crate::ports::{AuditLog, AuditLogError};

/// Append-only audit trail held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in insertion order.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    /// Entries for one quote, in insertion order.
    pub async fn entries_for(&self, quote_id: &QuoteId) -> Vec<AuditEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.quote_id() == quote_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id() == entry.id()) {
            return Err(AuditLogError::Duplicate(*entry.id()));
        }
        entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{QuoteStatus, Timestamp};

    #[tokio::test]
    async fn records_entries_in_order() {
        let log = InMemoryAuditLog::new();
        let quote_id = QuoteId::new();
        let first = AuditEntry::expiration(quote_id, QuoteStatus::Submitted, Timestamp::now());
        let other = AuditEntry::expiration(QuoteId::new(), QuoteStatus::Submitted, Timestamp::now());

        log.record(&first).await.unwrap();
        log.record(&other).await.unwrap();

        assert_eq!(log.len().await, 2);
        assert_eq!(log.entries_for(&quote_id).await, vec![first]);
    }

    #[tokio::test]
    async fn refuses_to_record_the_same_entry_twice() {
        let log = InMemoryAuditLog::new();
        let entry = AuditEntry::expiration(QuoteId::new(), QuoteStatus::Submitted, Timestamp::now());

        log.record(&entry).await.unwrap();
        assert!(matches!(
            log.record(&entry).await,
            Err(AuditLogError::Duplicate(id)) if id == *entry.id()
        ));
    }
}

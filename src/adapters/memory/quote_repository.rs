//! In-memory quote repository.
//!
//! Stores quotes in a map behind a single lock. The status check and write
//! in `update_status` happen under one write guard, which gives the same
//! compare-and-set behaviour as the PostgreSQL adapter's conditional UPDATE.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, QuoteId, QuoteStatus, Timestamp};
use crate::domain::quote::{Quote, QuoteTransition};
use crate::ports::{status_conflict, QuoteRepository};

/// In-memory storage for quotes, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<RwLock<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with quotes.
    pub fn with_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let map = quotes.into_iter().map(|q| (*q.id(), q)).collect();
        Self {
            quotes: Arc::new(RwLock::new(map)),
        }
    }

    /// Number of stored quotes.
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }

    /// Snapshot of every stored quote.
    pub async fn all(&self) -> Vec<Quote> {
        self.quotes.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn save(&self, quote: &Quote) -> Result<(), DomainError> {
        let mut quotes = self.quotes.write().await;
        if quotes.contains_key(quote.id()) {
            return Err(DomainError::validation(
                "id",
                format!("Quote already exists: {}", quote.id()),
            ));
        }
        quotes.insert(*quote.id(), quote.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError> {
        Ok(self.quotes.read().await.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &QuoteId,
        transition: &QuoteTransition,
        expected_status: Option<QuoteStatus>,
    ) -> Result<Quote, DomainError> {
        let mut quotes = self.quotes.write().await;
        let quote = quotes.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::QuoteNotFound, format!("Quote not found: {}", id))
        })?;

        if let Some(expected) = expected_status {
            if quote.status() != expected {
                return Err(status_conflict(id, expected, quote.status()));
            }
        }

        quote.apply_transition(transition)?;
        Ok(quote.clone())
    }

    async fn list_submitted_expired_before(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Quote>, DomainError> {
        let quotes = self.quotes.read().await;
        Ok(quotes
            .values()
            .filter(|q| q.is_expired_at(cutoff))
            .cloned()
            .collect())
    }
}

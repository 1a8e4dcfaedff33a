//! Integration tests for the quote decision cycle.
//!
//! Drives `ProcessQuoteHandler` through the public API with in-memory
//! adapters:
//! 1. Low-risk quote is approved and unlocks documents
//! 2. Hard-fail rule rejects with a reason
//! 3. Concurrent processing of one quote commits exactly once
//! 4. A failing audit log never undoes a committed decision

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Barrier;

use cargo_quote_engine::adapters::{FixedClock, InMemoryAuditLog, InMemoryQuoteRepository};
use cargo_quote_engine::application::{ProcessQuoteCommand, ProcessQuoteHandler};
use cargo_quote_engine::domain::audit::{AuditEntry, AuditOutcome};
use cargo_quote_engine::domain::foundation::{DomainError, QuoteId, QuoteStatus, Timestamp};
use cargo_quote_engine::domain::quote::{
    CargoCategory, CoveragePeriod, Location, Quote, QuoteError, QuoteTransition, Shipment,
    ShipmentValue, TransportMode,
};
use cargo_quote_engine::domain::underwriting::{
    RiskScorer, RuleCondition, RuleSet, Severity, UnderwritingRule, Validator,
};
use cargo_quote_engine::ports::{AuditLog, AuditLogError, QuoteRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn now() -> Timestamp {
    Timestamp::from_unix_secs(1_718_000_000).unwrap()
}

fn shipment(category: &str, value_minor_units: u64, origin: &str, destination: &str) -> Shipment {
    Shipment {
        cargo_category: CargoCategory::new(category).unwrap(),
        value: ShipmentValue::new(value_minor_units).unwrap(),
        origin: Location::new(origin, "Origin City", None).unwrap(),
        destination: Location::new(destination, "Destination City", Some("10115".to_string()))
            .unwrap(),
        transport_mode: TransportMode::Ocean,
        coverage: CoveragePeriod::new(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
        )
        .unwrap(),
    }
}

fn submitted(shipment: Shipment) -> Quote {
    let created = now().minus_hours(2);
    let mut quote = Quote::new(QuoteId::new(), shipment, created);
    quote.submit(now().add_days(14), created).unwrap();
    quote
}

/// Rejects electronics shipped out of one sanctioned origin; reviews high values.
fn rule_set() -> RuleSet {
    RuleSet::new(vec![
        UnderwritingRule::new(
            "restricted-route",
            Severity::Hard,
            RuleCondition::Route {
                cargo_categories: vec![CargoCategory::new("electronics").unwrap()],
                origin_countries: vec!["XK".to_string()],
                destination_countries: vec![],
            },
        )
        .with_reason("Route is not insurable for this cargo"),
        UnderwritingRule::new(
            "high-value",
            Severity::Soft,
            RuleCondition::ShipmentValueAbove { amount: 100_000_000 },
        ),
    ])
    .unwrap()
}

struct Engine {
    repository: Arc<dyn QuoteRepository>,
    audit_log: Arc<dyn AuditLog>,
}

impl Engine {
    fn handler(&self) -> ProcessQuoteHandler {
        ProcessQuoteHandler::new(
            self.repository.clone(),
            self.audit_log.clone(),
            Arc::new(FixedClock::new(now())),
            Arc::new(Validator::new(rule_set())),
            Arc::new(RiskScorer::default()),
        )
    }
}

/// Holds every reader at a barrier so concurrent deciders see the same status.
struct BarrierRepository {
    inner: InMemoryQuoteRepository,
    barrier: Barrier,
}

#[async_trait]
impl QuoteRepository for BarrierRepository {
    async fn save(&self, quote: &Quote) -> Result<(), DomainError> {
        self.inner.save(quote).await
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError> {
        let found = self.inner.find_by_id(id).await;
        self.barrier.wait().await;
        found
    }

    async fn update_status(
        &self,
        id: &QuoteId,
        transition: &QuoteTransition,
        expected_status: Option<QuoteStatus>,
    ) -> Result<Quote, DomainError> {
        self.inner.update_status(id, transition, expected_status).await
    }

    async fn list_submitted_expired_before(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Quote>, DomainError> {
        self.inner.list_submitted_expired_before(cutoff).await
    }
}

struct UnavailableAuditLog;

#[async_trait]
impl AuditLog for UnavailableAuditLog {
    async fn record(&self, _entry: &AuditEntry) -> Result<(), AuditLogError> {
        Err(AuditLogError::Unavailable("connection reset".to_string()))
    }
}

// =============================================================================
// Decisions
// =============================================================================

#[tokio::test]
async fn low_risk_quote_is_approved_and_unlocks_documents() {
    let quote = submitted(shipment("general", 1_500_000, "NL", "DE"));
    let repository = Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()]));
    let audit_log = Arc::new(InMemoryAuditLog::new());
    let engine = Engine {
        repository: repository.clone(),
        audit_log: audit_log.clone(),
    };

    let result = engine
        .handler()
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();

    assert_eq!(result.status(), QuoteStatus::Approved);
    assert!(result.requires_documents);
    assert!(result.auto_approved);
    assert!(result.validation.is_valid);
    assert!(result.validation.reasons.is_empty());

    let stored = repository.find_by_id(quote.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), QuoteStatus::Approved);
    assert_eq!(stored.rejection_reason(), None);
    assert_eq!(stored.approved_at(), Some(&now()));
    assert!(stored.risk_score().unwrap().value() <= 100);
    assert_eq!(stored.shipment(), quote.shipment());

    assert_eq!(audit_log.len().await, 1);
}

#[tokio::test]
async fn hard_fail_route_is_rejected_with_reason() {
    let quote = submitted(shipment("electronics", 2_000_000, "XK", "DE"));
    let repository = Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()]));
    let engine = Engine {
        repository: repository.clone(),
        audit_log: Arc::new(InMemoryAuditLog::new()),
    };

    let result = engine
        .handler()
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();

    assert_eq!(result.status(), QuoteStatus::Rejected);
    assert!(!result.requires_documents);
    assert!(!result.validation.is_valid);

    let stored = repository.find_by_id(quote.id()).await.unwrap().unwrap();
    let reason = stored.rejection_reason().unwrap();
    assert!(!reason.trim().is_empty());
    assert_eq!(reason, "Route is not insurable for this cargo");
    assert_eq!(stored.approved_at(), None);
}

#[tokio::test]
async fn hard_failure_outranks_soft_failure() {
    let quote = submitted(shipment("electronics", 500_000_000, "XK", "DE"));
    let engine = Engine {
        repository: Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()])),
        audit_log: Arc::new(InMemoryAuditLog::new()),
    };

    let result = engine
        .handler()
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();

    assert_eq!(result.status(), QuoteStatus::Rejected);
    assert_eq!(result.validation.reasons.len(), 2);
    assert!(result.quote.rejection_reason().unwrap().contains("; "));
}

#[tokio::test]
async fn high_value_quote_goes_to_review() {
    let quote = submitted(shipment("general", 250_000_000, "NL", "DE"));
    let engine = Engine {
        repository: Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()])),
        audit_log: Arc::new(InMemoryAuditLog::new()),
    };

    let result = engine
        .handler()
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();

    assert_eq!(result.status(), QuoteStatus::UnderReview);
    assert!(!result.requires_documents);
    assert_eq!(result.quote.rejection_reason(), None);
    assert_eq!(result.quote.approved_at(), None);
}

#[tokio::test]
async fn processing_a_decided_quote_changes_nothing() {
    let quote = submitted(shipment("general", 1_500_000, "NL", "DE"));
    let repository = Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()]));
    let engine = Engine {
        repository: repository.clone(),
        audit_log: Arc::new(InMemoryAuditLog::new()),
    };
    let handler = engine.handler();
    handler
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();
    let decided = repository.find_by_id(quote.id()).await.unwrap().unwrap();

    let again = handler
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await;

    assert!(matches!(again, Err(QuoteError::NotProcessable { status: QuoteStatus::Approved, .. })));
    assert_eq!(repository.find_by_id(quote.id()).await.unwrap().unwrap(), decided);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_processing_commits_exactly_once() {
    let quote = submitted(shipment("general", 1_500_000, "NL", "DE"));
    let repository = Arc::new(BarrierRepository {
        inner: InMemoryQuoteRepository::with_quotes([quote.clone()]),
        barrier: Barrier::new(2),
    });
    let audit_log = Arc::new(InMemoryAuditLog::new());
    let engine = Engine {
        repository: repository.clone(),
        audit_log: audit_log.clone(),
    };
    let first = engine.handler();
    let second = engine.handler();
    let id = *quote.id();

    let (a, b) = tokio::join!(
        first.handle(ProcessQuoteCommand { quote_id: id }),
        second.handle(ProcessQuoteCommand { quote_id: id }),
    );

    let outcomes = [a, b];
    let committed = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts: Vec<_> = outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .collect();

    assert_eq!(committed, 1);
    assert_eq!(conflicts.len(), 1);
    assert!(matches!(
        conflicts[0],
        QuoteError::Conflict { expected: QuoteStatus::Submitted, .. }
    ));
    assert!(conflicts[0].is_retryable());

    let entries = audit_log.entries_for(&id).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.outcome() == AuditOutcome::Committed)
            .count(),
        1
    );
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.outcome() == AuditOutcome::Conflict)
            .count(),
        1
    );
}

// =============================================================================
// Audit failures
// =============================================================================

#[tokio::test]
async fn audit_outage_does_not_undo_decision() {
    let quote = submitted(shipment("electronics", 2_000_000, "XK", "DE"));
    let repository = Arc::new(InMemoryQuoteRepository::with_quotes([quote.clone()]));
    let engine = Engine {
        repository: repository.clone(),
        audit_log: Arc::new(UnavailableAuditLog),
    };

    let result = engine
        .handler()
        .handle(ProcessQuoteCommand { quote_id: *quote.id() })
        .await
        .unwrap();

    assert!(!result.audit_recorded);
    assert_eq!(result.status(), QuoteStatus::Rejected);
    let stored = repository.find_by_id(quote.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), QuoteStatus::Rejected);
}

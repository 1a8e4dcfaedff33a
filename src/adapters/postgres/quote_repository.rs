//! PostgreSQL implementation of QuoteRepository.
//!
//! Persists Quote aggregates to the `quotes` table. `update_status` locks
//! the row (`SELECT ... FOR UPDATE`) and checks the expected status inside
//! the same transaction as the write, so two writers that read the same
//! prior status cannot both commit.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, QuoteId, QuoteStatus, RiskScore, Timestamp,
};
use crate::domain::quote::{
    CargoCategory, CoveragePeriod, Location, Quote, QuoteTransition, Shipment, ShipmentValue,
    TransportMode,
};
use crate::ports::{status_conflict, QuoteRepository};

const QUOTE_COLUMNS: &str = r#"
    id, cargo_category, value_minor_units,
    origin_country, origin_city, origin_postal_code,
    destination_country, destination_city, destination_postal_code,
    transport_mode, coverage_start, coverage_end,
    status, risk_score, rejection_reason, approved_at, quote_expires_at,
    created_at, updated_at
"#;

/// PostgreSQL implementation of QuoteRepository.
#[derive(Clone)]
pub struct PostgresQuoteRepository {
    pool: PgPool,
}

impl PostgresQuoteRepository {
    /// Creates a new PostgresQuoteRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn save(&self, quote: &Quote) -> Result<(), DomainError> {
        let shipment = quote.shipment();
        let value = i64::try_from(shipment.value.minor_units()).map_err(|_| {
            DomainError::validation("value", "Shipment value exceeds storable range")
        })?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, cargo_category, value_minor_units,
                origin_country, origin_city, origin_postal_code,
                destination_country, destination_city, destination_postal_code,
                transport_mode, coverage_start, coverage_end,
                status, risk_score, rejection_reason, approved_at, quote_expires_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(quote.id().as_uuid())
        .bind(shipment.cargo_category.as_str())
        .bind(value)
        .bind(shipment.origin.country())
        .bind(shipment.origin.city())
        .bind(shipment.origin.postal_code())
        .bind(shipment.destination.country())
        .bind(shipment.destination.city())
        .bind(shipment.destination.postal_code())
        .bind(transport_mode_to_str(shipment.transport_mode))
        .bind(shipment.coverage.start())
        .bind(shipment.coverage.end())
        .bind(quote_status_to_str(quote.status()))
        .bind(quote.risk_score().map(|s| i16::from(s.value())))
        .bind(quote.rejection_reason())
        .bind(quote.approved_at().map(|t| *t.as_datetime()))
        .bind(quote.quote_expires_at().map(|t| *t.as_datetime()))
        .bind(quote.created_at().as_datetime())
        .bind(quote.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::validation("id", format!("Quote already exists: {}", quote.id()))
            } else {
                DomainError::database("Failed to insert quote", e)
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM quotes WHERE id = $1", QUOTE_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch quote", e))?;

        row.map(row_to_quote).transpose()
    }

    async fn update_status(
        &self,
        id: &QuoteId,
        transition: &QuoteTransition,
        expected_status: Option<QuoteStatus>,
    ) -> Result<Quote, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM quotes WHERE id = $1 FOR UPDATE",
            QUOTE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to lock quote", e))?;

        let mut quote = match row {
            Some(row) => row_to_quote(row)?,
            None => {
                return Err(DomainError::new(
                    ErrorCode::QuoteNotFound,
                    format!("Quote not found: {}", id),
                ))
            }
        };

        if let Some(expected) = expected_status {
            if quote.status() != expected {
                return Err(status_conflict(id, expected, quote.status()));
            }
        }

        quote.apply_transition(transition)?;

        sqlx::query(
            r#"
            UPDATE quotes SET
                status = $2,
                risk_score = $3,
                rejection_reason = $4,
                approved_at = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(quote_status_to_str(quote.status()))
        .bind(quote.risk_score().map(|s| i16::from(s.value())))
        .bind(quote.rejection_reason())
        .bind(quote.approved_at().map(|t| *t.as_datetime()))
        .bind(quote.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to update quote status", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit quote status", e))?;

        Ok(quote)
    }

    async fn list_submitted_expired_before(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Quote>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM quotes
            WHERE status = 'submitted' AND quote_expires_at < $1
            ORDER BY quote_expires_at ASC
            "#,
            QUOTE_COLUMNS
        ))
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list expired quotes", e))?;

        rows.into_iter().map(row_to_quote).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn quote_status_to_str(status: QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Draft => "draft",
        QuoteStatus::Submitted => "submitted",
        QuoteStatus::UnderReview => "under_review",
        QuoteStatus::Approved => "approved",
        QuoteStatus::Rejected => "rejected",
        QuoteStatus::Expired => "expired",
    }
}

pub(super) fn str_to_quote_status(s: &str) -> Result<QuoteStatus, DomainError> {
    QuoteStatus::ALL
        .iter()
        .copied()
        .find(|status| quote_status_to_str(*status) == s)
        .ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid quote status: {}", s))
        })
}

fn transport_mode_to_str(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Air => "air",
        TransportMode::Ocean => "ocean",
        TransportMode::Road => "road",
        TransportMode::Rail => "rail",
    }
}

fn str_to_transport_mode(s: &str) -> Result<TransportMode, DomainError> {
    match s {
        "air" => Ok(TransportMode::Air),
        "ocean" => Ok(TransportMode::Ocean),
        "road" => Ok(TransportMode::Road),
        "rail" => Ok(TransportMode::Rail),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid transport mode: {}", s),
        )),
    }
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn get<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", column), e))
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {}: {}", column, err),
    )
}

fn row_to_quote(row: sqlx::postgres::PgRow) -> Result<Quote, DomainError> {
    let id: uuid::Uuid = get(&row, "id")?;

    let cargo_category: String = get(&row, "cargo_category")?;
    let value: i64 = get(&row, "value_minor_units")?;
    let value = u64::try_from(value)
        .map_err(|e| corrupt("value_minor_units", e))
        .and_then(|v| ShipmentValue::new(v).map_err(|e| corrupt("value_minor_units", e)))?;

    let origin = Location::new(
        get::<String>(&row, "origin_country")?,
        get::<String>(&row, "origin_city")?,
        get::<Option<String>>(&row, "origin_postal_code")?,
    )
    .map_err(|e| corrupt("origin", e))?;
    let destination = Location::new(
        get::<String>(&row, "destination_country")?,
        get::<String>(&row, "destination_city")?,
        get::<Option<String>>(&row, "destination_postal_code")?,
    )
    .map_err(|e| corrupt("destination", e))?;

    let transport_mode = str_to_transport_mode(&get::<String>(&row, "transport_mode")?)?;
    let coverage = CoveragePeriod::new(
        get::<chrono::NaiveDate>(&row, "coverage_start")?,
        get::<chrono::NaiveDate>(&row, "coverage_end")?,
    )
    .map_err(|e| corrupt("coverage", e))?;

    let status = str_to_quote_status(&get::<String>(&row, "status")?)?;
    let risk_score = get::<Option<i16>>(&row, "risk_score")?
        .map(|v| {
            u8::try_from(v)
                .map_err(|e| corrupt("risk_score", e))
                .and_then(|v| RiskScore::try_new(v).map_err(|e| corrupt("risk_score", e)))
        })
        .transpose()?;

    let rejection_reason: Option<String> = get(&row, "rejection_reason")?;
    let approved_at: Option<chrono::DateTime<chrono::Utc>> = get(&row, "approved_at")?;
    let quote_expires_at: Option<chrono::DateTime<chrono::Utc>> = get(&row, "quote_expires_at")?;
    let created_at: chrono::DateTime<chrono::Utc> = get(&row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = get(&row, "updated_at")?;

    Ok(Quote::reconstitute(
        QuoteId::from_uuid(id),
        Shipment {
            cargo_category: CargoCategory::new(cargo_category)
                .map_err(|e| corrupt("cargo_category", e))?,
            value,
            origin,
            destination,
            transport_mode,
            coverage,
        },
        status,
        risk_score,
        rejection_reason,
        approved_at.map(Timestamp::from_datetime),
        quote_expires_at.map(Timestamp::from_datetime),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

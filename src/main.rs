//! quote-engine worker.
//!
//! Loads configuration, connects storage and runs the expiration worker
//! until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use cargo_quote_engine::adapters::postgres::MIGRATOR;
use cargo_quote_engine::adapters::{
    ExpirationWorker, InMemoryAuditLog, InMemoryQuoteRepository, PostgresAuditLog,
    PostgresQuoteRepository, SystemClock,
};
use cargo_quote_engine::application::SweepExpiredQuotesHandler;
use cargo_quote_engine::config::{AppConfig, RuntimeConfig};
use cargo_quote_engine::ports::{AuditLog, QuoteRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.runtime)?;

    let rules = config.underwriting.rule_set()?;
    tracing::info!(
        environment = ?config.runtime.environment,
        rules = rules.len(),
        "Configuration loaded"
    );

    let (repository, audit_log) = connect_storage(&config).await?;

    if !config.sweeper.enabled {
        tracing::info!("Expiration sweeper disabled; exiting");
        return Ok(());
    }

    let sweeper = Arc::new(SweepExpiredQuotesHandler::new(repository, audit_log));
    let worker = ExpirationWorker::with_config(
        sweeper,
        Arc::new(SystemClock),
        config.sweeper.worker_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = tokio::spawn(async move { worker.run(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    // The worker may already have exited; nothing left to signal then.
    let _ = shutdown_tx.send(true);

    let total_expired = worker_task.await?;
    tracing::info!(total_expired, "Shutdown complete");
    Ok(())
}

fn init_tracing(runtime: &RuntimeConfig) -> Result<(), BoxError> {
    let filter: EnvFilter = runtime.env_filter()?;
    if runtime.use_json_logs() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn connect_storage(
    config: &AppConfig,
) -> Result<(Arc<dyn QuoteRepository>, Arc<dyn AuditLog>), BoxError> {
    let Some(database) = &config.database else {
        tracing::warn!("No database configured; using in-memory storage");
        return Ok((
            Arc::new(InMemoryQuoteRepository::new()),
            Arc::new(InMemoryAuditLog::new()),
        ));
    };

    let pool = database.pool_options().connect(&database.url).await?;
    tracing::info!(
        url = %database.redacted_url(),
        max_connections = database.max_connections,
        "Connected to PostgreSQL"
    );

    if database.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    Ok((
        Arc::new(PostgresQuoteRepository::new(pool.clone())),
        Arc::new(PostgresAuditLog::new(pool)),
    ))
}

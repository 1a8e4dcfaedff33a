//! ExpirationWorker - Background service that lapses overdue quotes.
//!
//! Runs the expiration sweep on a fixed interval using the clock port for
//! "now". A failed sweep is logged and retried on the next tick; it never
//! stops the worker.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `sweep_interval` | 60s | Time between sweeps |
//! | `run_on_start` | true | Sweep immediately instead of waiting one interval |
//!
//! ## Graceful Shutdown
//!
//! The worker listens for a shutdown signal. A sweep in progress stops
//! between quote updates; quotes already expired stay expired.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::{SweepExpiredQuotesHandler, SweepReport};
use crate::domain::quote::QuoteError;
use crate::ports::Clock;

/// Configuration for the ExpirationWorker service.
#[derive(Debug, Clone)]
pub struct ExpirationWorkerConfig {
    /// Time between sweeps.
    pub sweep_interval: Duration,

    /// Sweep as soon as the worker starts.
    pub run_on_start: bool,
}

impl Default for ExpirationWorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            run_on_start: true,
        }
    }
}

impl ExpirationWorkerConfig {
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }
}

/// Background service that periodically runs the expiration sweep.
pub struct ExpirationWorker {
    sweeper: Arc<SweepExpiredQuotesHandler>,
    clock: Arc<dyn Clock>,
    config: ExpirationWorkerConfig,
}

impl ExpirationWorker {
    /// Create a new worker with default configuration.
    pub fn new(sweeper: Arc<SweepExpiredQuotesHandler>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(sweeper, clock, ExpirationWorkerConfig::default())
    }

    pub fn with_config(
        sweeper: Arc<SweepExpiredQuotesHandler>,
        clock: Arc<dyn Clock>,
        config: ExpirationWorkerConfig,
    ) -> Self {
        Self {
            sweeper,
            clock,
            config,
        }
    }

    /// Run the sweep loop until the shutdown signal is received.
    ///
    /// Returns the total number of quotes expired while running.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut interval = time::interval(self.config.sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.run_on_start {
            // The first tick completes immediately.
            interval.tick().await;
        }

        tracing::info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            "Expiration worker started"
        );

        let mut total_expired = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                _ = interval.tick() => {
                    match self.tick(Some(&shutdown)).await {
                        Ok(report) => {
                            total_expired += report.expired;
                            if report.interrupted {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Expiration sweep failed; retrying next interval");
                        }
                    }
                }
            }
        }

        tracing::info!(total_expired, "Expiration worker stopped");
        total_expired
    }

    /// Run exactly one sweep at the clock's current time.
    pub async fn run_once(&self) -> Result<SweepReport, QuoteError> {
        self.tick(None).await
    }

    async fn tick(
        &self,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<SweepReport, QuoteError> {
        let now = self.clock.now();
        self.sweeper.sweep(now, shutdown).await
    }
}

//! Metrics collection for observability
//!
//! Prometheus metrics for the transactions run by [`crate::Ledger`]. Every
//! collector lives in a registry owned by the ledger instance.
//!
//! # Metrics
//!
//! - `ledger_transactions_total` - Transactions by operation and outcome
//! - `ledger_transaction_duration_seconds` - Histogram of transaction latencies
//! - `ledger_written_off_assets_total` - Assets deleted as total loss

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Outcome label for a committed transaction
pub const OUTCOME_COMMITTED: &str = "committed";

/// Outcome label for an aborted transaction
pub const OUTCOME_ABORTED: &str = "aborted";

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Transactions by operation and outcome
    pub transactions_total: IntCounterVec,

    /// Transaction duration histogram
    pub transaction_duration: HistogramVec,

    /// Assets written off
    pub written_off_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("written_off_total", &self.written_off_total.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transactions_total = IntCounterVec::new(
            Opts::new(
                "ledger_transactions_total",
                "Total number of ledger transactions",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(transactions_total.clone()))?;

        let transaction_duration = HistogramVec::new(
            HistogramOpts::new(
                "ledger_transaction_duration_seconds",
                "Histogram of transaction latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(transaction_duration.clone()))?;

        let written_off_total = IntCounter::new(
            "ledger_written_off_assets_total",
            "Total number of assets written off as total loss",
        )?;
        registry.register(Box::new(written_off_total.clone()))?;

        Ok(Self {
            transactions_total,
            transaction_duration,
            written_off_total,
            registry,
        })
    }

    /// Record a finished transaction
    pub fn record_transaction(&self, operation: &str, committed: bool, duration_seconds: f64) {
        let outcome = if committed {
            OUTCOME_COMMITTED
        } else {
            OUTCOME_ABORTED
        };
        self.transactions_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.transaction_duration
            .with_label_values(&[operation])
            .observe(duration_seconds);
    }

    /// Record a total-loss write-off
    pub fn record_write_off(&self) {
        self.written_off_total.inc();
    }

    /// Count of transactions for an operation and outcome
    pub fn transaction_count(&self, operation: &str, outcome: &str) -> u64 {
        self.transactions_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

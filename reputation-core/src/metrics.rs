//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `reputation_users_registered_total` - Successful registrations
//! - `reputation_transactions_initiated_total` - Successful transaction initiations
//! - `reputation_rejections_total{kind}` - Rejected calls by failure kind
//! - `reputation_registered_users` - Current registry size

use crate::types::RejectionKind;
use prometheus::{
    core::Collector, Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns a private registry, so several state machines can
/// live in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Successful registrations
    pub users_registered: IntCounter,

    /// Successful transaction initiations
    pub transactions_initiated: IntCounter,

    /// Rejections by kind
    pub rejections: IntCounterVec,

    /// Current registry size
    pub registered_users: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("users_registered", &self.users_registered.get())
            .field("transactions_initiated", &self.transactions_initiated.get())
            .field("registered_users", &self.registered_users.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let users_registered = IntCounter::new(
            "reputation_users_registered_total",
            "Total number of successful user registrations",
        )?;
        registry.register(Box::new(users_registered.clone()))?;

        let transactions_initiated = IntCounter::new(
            "reputation_transactions_initiated_total",
            "Total number of transactions initiated",
        )?;
        registry.register(Box::new(transactions_initiated.clone()))?;

        let rejections = IntCounterVec::new(
            Opts::new("reputation_rejections_total", "Rejected calls by failure kind"),
            &["kind"],
        )?;
        registry.register(Box::new(rejections.clone()))?;

        let registered_users = IntGauge::new(
            "reputation_registered_users",
            "Number of registered identities",
        )?;
        registry.register(Box::new(registered_users.clone()))?;

        Ok(Self {
            users_registered,
            transactions_initiated,
            rejections,
            registered_users,
            registry,
        })
    }

    /// Record successful registration
    pub fn record_registration(&self) {
        self.users_registered.inc();
        self.registered_users.inc();
    }

    /// Record successful transaction initiation
    pub fn record_transaction(&self) {
        self.transactions_initiated.inc();
    }

    /// Record rejected call
    pub fn record_rejection(&self, kind: RejectionKind) {
        self.rejections.with_label_values(&[kind.as_str()]).inc();
    }

    /// Rejection count for one kind
    ///
    /// Reads the collected families so that no empty series is created for
    /// kinds that were never recorded.
    pub fn rejection_count(&self, kind: RejectionKind) -> u64 {
        self.rejections
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.get_name() == "kind" && label.get_value() == kind.as_str())
            })
            .map(|metric| metric.get_counter().get_value() as u64)
            .unwrap_or(0)
    }

    /// Render all metrics in the text exposition format
    pub fn gather_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! # Metrics
//!
//! Prometheus metrics for sync runs.
//!
//! - `secretsync_total{result}` - runs by classification
//! - `secretsync_latency_seconds` - wall clock duration of a run
//! - `secretsync_last_success_time` - epoch seconds of the last fully successful run

use crate::error::Result;
use crate::sync::status::SyncResult;
use chrono::{DateTime, Utc};
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Receives the outcome of every run. Implementations must tolerate
/// concurrent calls from many runs.
pub trait MetricsSink: Send + Sync {
    fn observe_run(&self, result: SyncResult, elapsed: Duration);

    fn mark_success(&self, at: DateTime<Utc>);
}

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    runs_total: IntCounterVec,
    latency: Histogram,
    last_success: Gauge,
}

impl Metrics {
    /// Create the sync metrics and register them in `registry`
    pub fn register(registry: Registry) -> Result<Self> {
        let runs_total = IntCounterVec::new(
            Opts::new("secretsync_total", "Total number of sync operations"),
            &["result"],
        )?;
        let latency = Histogram::with_opts(
            HistogramOpts::new("secretsync_latency_seconds", "Time taken for sync")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        let last_success = Gauge::new(
            "secretsync_last_success_time",
            "Timestamp of last successful sync",
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(last_success.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            latency,
            last_success,
        })
    }

    /// Number of runs recorded with the given classification
    pub fn runs(&self, result: SyncResult) -> u64 {
        self.runs_total.with_label_values(&[result.as_str()]).get()
    }

    pub fn last_success_seconds(&self) -> f64 {
        self.last_success.get()
    }

    pub fn latency_samples(&self) -> u64 {
        self.latency.get_sample_count()
    }

    /// Render every registered metric in the text exposition format
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

impl MetricsSink for Metrics {
    fn observe_run(&self, result: SyncResult, elapsed: Duration) {
        self.runs_total.with_label_values(&[result.as_str()]).inc();
        self.latency.observe(elapsed.as_secs_f64());
    }

    fn mark_success(&self, at: DateTime<Utc>) {
        self.last_success.set(at.timestamp() as f64);
    }
}

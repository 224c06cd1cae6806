// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Folding per-namespace outcomes into a run classification and status

use crate::metrics::MetricsSink;
use crate::types::SecretSyncStatus;
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Classification of a run, used as the `result` metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    Success,
    PartialSuccess,
    Failure,
}

impl SyncResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncResult::Success => "success",
            SyncResult::PartialSuccess => "partial_success",
            SyncResult::Failure => "failure",
        }
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaces that converged and namespaces whose write failed.
/// A namespace lands in exactly one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    synced: BTreeSet<String>,
    failed: BTreeSet<String>,
}

impl SyncSummary {
    pub fn record_synced(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.failed.remove(&namespace);
        self.synced.insert(namespace);
    }

    pub fn record_failed(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.synced.remove(&namespace);
        self.failed.insert(namespace);
    }

    pub fn synced(&self) -> Vec<String> {
        self.synced.iter().cloned().collect()
    }

    pub fn failed(&self) -> Vec<String> {
        self.failed.iter().cloned().collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// All successes is `success`, all failures is `failure`, anything
    /// else (mixed, or nothing attempted) is `partial_success`.
    pub fn classify(&self) -> SyncResult {
        match (self.synced.is_empty(), self.failed.is_empty()) {
            (false, true) => SyncResult::Success,
            (true, false) => SyncResult::Failure,
            _ => SyncResult::PartialSuccess,
        }
    }

    /// Status replacing whatever the request carried before
    pub fn to_status(&self, now: DateTime<Utc>) -> SecretSyncStatus {
        SecretSyncStatus {
            synced_namespaces: self.synced(),
            failed_namespaces: self.failed(),
            last_sync_time: Some(Time(now)),
        }
    }
}

/// Export the outcome of one run
pub fn record_metrics(
    sink: &dyn MetricsSink,
    result: SyncResult,
    elapsed: Duration,
    now: DateTime<Utc>,
) {
    sink.observe_run(result, elapsed);
    if result == SyncResult::Success {
        sink.mark_success(now);
    }
}

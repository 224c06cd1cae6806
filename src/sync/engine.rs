// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One reconciliation run of a SecretSync: fetch, validate, resolve,
//! apply, aggregate, persist.

use crate::config::Config;
use crate::error::{Result, SecretSyncError};
use crate::metrics::MetricsSink;
use crate::sync::secrets::{apply_secret, ApplyResult, Ownership};
use crate::sync::status::{record_metrics, SyncResult, SyncSummary};
use crate::sync::store::Backend;
use crate::sync::targets::resolve_targets;
use crate::types::{SecretSync, SecretSyncStatus};
use chrono::Utc;
use futures::{stream, StreamExt};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// How a completed run is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClassification {
    Success,
    PartialSuccess,
    Failure,
    /// The spec names no usable source; nothing was attempted
    InvalidSpec,
}

impl From<SyncResult> for RunClassification {
    fn from(result: SyncResult) -> Self {
        match result {
            SyncResult::Success => RunClassification::Success,
            SyncResult::PartialSuccess => RunClassification::PartialSuccess,
            SyncResult::Failure => RunClassification::Failure,
        }
    }
}

/// Outcome of a run that got past fetching the request
#[derive(Debug)]
pub struct RunReport {
    pub classification: RunClassification,
    pub synced: Vec<String>,
    pub failed: Vec<String>,
    /// When the request should run again, regardless of outcome
    pub requeue_after: Duration,
    /// Whether the caller should treat this run as an error
    pub apply_backoff: bool,
    pub error: Option<SecretSyncError>,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// The request no longer exists
    Absent,
    Completed(RunReport),
}

/// Tunables of the engine, taken from the operator config
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub controller_id: String,
    pub default_sync_interval: Duration,
    pub apply_concurrency: usize,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            controller_id: config.controller_id.clone(),
            default_sync_interval: config.default_sync_interval,
            apply_concurrency: config.apply_concurrency.max(1),
        }
    }
}

pub struct SyncEngine {
    backend: Arc<dyn Backend>,
    metrics: Arc<dyn MetricsSink>,
    settings: EngineSettings,
}

impl SyncEngine {
    pub fn new(
        backend: Arc<dyn Backend>,
        metrics: Arc<dyn MetricsSink>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            backend,
            metrics,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Number of SecretSyncs currently stored in the cluster
    pub async fn count_requests(&self) -> Result<usize> {
        Ok(self.backend.list_requests().await?.len())
    }

    /// Run the SecretSync `namespace/name` once.
    ///
    /// Returns `Err` only when the request itself could not be read.
    #[instrument(skip(self))]
    pub async fn run(&self, namespace: &str, name: &str) -> Result<RunOutcome> {
        let started = Instant::now();

        let request = match self.backend.get_request(namespace, name).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                info!("SecretSync not found, skipping");
                return Ok(RunOutcome::Absent);
            }
            Err(e) => {
                error!("Failed to get SecretSync: {}", e);
                self.record_failure(started);
                return Err(e);
            }
        };

        let requeue_after = request
            .spec
            .sync_interval_or(self.settings.default_sync_interval);

        if let Err(e) = request.spec.validate() {
            error!("{}", e);
            let status = SecretSyncStatus {
                last_sync_time: Some(Time(Utc::now())),
                ..Default::default()
            };
            self.persist_status(&request, &status).await;
            self.record_failure(started);
            return Ok(RunOutcome::Completed(RunReport {
                classification: RunClassification::InvalidSpec,
                synced: Vec::new(),
                failed: Vec::new(),
                requeue_after,
                apply_backoff: false,
                error: Some(e),
            }));
        }

        let report = match self.sync_targets(&request).await {
            Ok(summary) => {
                let now = Utc::now();
                self.persist_status(&request, &summary.to_status(now)).await;

                let result = summary.classify();
                record_metrics(self.metrics.as_ref(), result, started.elapsed(), now);
                info!(
                    "Sync finished: {} ({} synced, {} failed)",
                    result,
                    summary.synced().len(),
                    summary.failed().len()
                );

                let failed = summary.failed();
                RunReport {
                    classification: result.into(),
                    synced: summary.synced(),
                    error: summary
                        .has_failures()
                        .then(|| SecretSyncError::TargetsFailed(failed.clone())),
                    apply_backoff: summary.has_failures(),
                    failed,
                    requeue_after,
                }
            }
            Err(e) => {
                error!("Sync failed before any secret was written: {}", e);
                self.record_failure(started);
                RunReport {
                    classification: RunClassification::Failure,
                    synced: Vec::new(),
                    failed: Vec::new(),
                    requeue_after,
                    apply_backoff: true,
                    error: Some(e),
                }
            }
        };

        Ok(RunOutcome::Completed(report))
    }

    /// Fetch the source, resolve targets and apply to each of them.
    /// Errors abort the whole run; per-namespace failures do not.
    async fn sync_targets(&self, request: &SecretSync) -> Result<SyncSummary> {
        let spec = &request.spec;

        let source = match self
            .backend
            .get_secret(&spec.source_namespace, &spec.source_secret_name)
            .await
        {
            Ok(Some(source)) => source,
            Ok(None) => {
                return Err(SecretSyncError::SourceUnavailable {
                    namespace: spec.source_namespace.clone(),
                    name: spec.source_secret_name.clone(),
                    reason: "not found".to_string(),
                })
            }
            Err(e) => {
                return Err(SecretSyncError::SourceUnavailable {
                    namespace: spec.source_namespace.clone(),
                    name: spec.source_secret_name.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let targets = resolve_targets(self.backend.as_ref(), spec).await?;
        let target_name = spec.target_name(&spec.source_secret_name);
        let request_key = request.key();
        let owner = Ownership {
            controller_id: &self.settings.controller_id,
            request: &request_key,
        };

        info!(
            "Syncing {}/{} to {} namespace(s) as {}",
            spec.source_namespace,
            spec.source_secret_name,
            targets.len(),
            target_name
        );

        let store = self.backend.as_ref();
        let results: Vec<(String, Result<ApplyResult>)> = stream::iter(targets)
            .map(|namespace| {
                let (source, owner) = (&source, &owner);
                async move {
                    let result = apply_secret(store, source, &namespace, target_name, owner).await;
                    (namespace, result)
                }
            })
            .buffer_unordered(self.settings.apply_concurrency.max(1))
            .collect()
            .await;

        let mut summary = SyncSummary::default();
        for (namespace, result) in results {
            match result {
                Ok(applied) => {
                    debug!("Namespace {}: {:?}", namespace, applied);
                    summary.record_synced(namespace);
                }
                Err(e) => {
                    warn!("Failed to sync secret to namespace {}: {}", namespace, e);
                    summary.record_failed(namespace);
                }
            }
        }
        Ok(summary)
    }

    fn record_failure(&self, started: Instant) {
        record_metrics(
            self.metrics.as_ref(),
            SyncResult::Failure,
            started.elapsed(),
            Utc::now(),
        );
    }

    /// Status write failures are logged and otherwise ignored
    async fn persist_status(&self, request: &SecretSync, status: &SecretSyncStatus) {
        if let Err(e) = self.backend.write_status(request, status).await {
            warn!(
                "{}",
                SecretSyncError::StatusPersist(format!("{}: {}", request.key(), e))
            );
        }
    }
}

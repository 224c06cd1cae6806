// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! SecretSync reconciler - runs the sync engine for every request and
//! re-triggers requests when their source secret or a target namespace changes.

use crate::error::{Result, SecretSyncError};
use crate::sync::{requests_for_location, requests_for_source, RunOutcome, SyncEngine};
use crate::types::SecretSync;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::{
    runtime::{controller::Action, predicates, reflector, watcher, Controller, WatchStreamExt},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Shared state handed to every reconcile call
pub struct Context {
    pub engine: SyncEngine,
}

pub struct SecretSyncReconciler {
    client: Client,
    context: Arc<Context>,
    is_ready: Arc<AtomicBool>,
}

impl SecretSyncReconciler {
    pub fn new(client: Client, engine: SyncEngine, is_ready: Arc<AtomicBool>) -> Self {
        Self {
            client,
            context: Arc::new(Context { engine }),
            is_ready,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.context.engine.count_requests().await {
            Ok(count) => info!("Found {} existing SecretSync(s)", count),
            Err(e) => warn!("Failed to list SecretSyncs: {}", e),
        }

        let requests: Api<SecretSync> = Api::all(self.client.clone());
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let namespaces: Api<Namespace> = Api::all(self.client.clone());

        let (reader, writer) = reflector::store();
        let objects = watcher(requests, WatcherConfig::default())
            .default_backoff()
            .reflect(writer)
            .applied_objects();

        let controller = Controller::for_stream(spec_changes(objects), reader);
        let by_source = controller.store();
        let by_location = controller.store();

        self.is_ready.store(true, Ordering::Relaxed);
        info!("Watching SecretSyncs, Secrets and Namespaces");

        controller
            .watches(secrets, WatcherConfig::default(), move |secret: Secret| {
                requests_for_source(&secret, &by_source.state())
            })
            .watches(namespaces, WatcherConfig::default(), move |namespace: Namespace| {
                requests_for_location(&namespace, &by_location.state())
            })
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled SecretSync: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        self.is_ready.store(false, Ordering::Relaxed);
        info!("SecretSync controller stopped");
        Ok(())
    }
}

/// Drop SecretSync events that leave `metadata.generation` untouched.
/// Status writes never bump it, so a run does not trigger the next one.
pub fn spec_changes<S>(objects: S) -> impl Stream<Item = S::Item> + Send
where
    S: Stream<Item = std::result::Result<SecretSync, watcher::Error>> + Send + 'static,
{
    objects.predicate_filter(predicates::generation)
}

#[instrument(skip(request, ctx), fields(request = %request.key()))]
async fn reconcile(request: Arc<SecretSync>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = request.namespace().unwrap_or_default();
    let name = request.name_any();

    match ctx.engine.run(&namespace, &name).await? {
        RunOutcome::Absent => Ok(Action::await_change()),
        RunOutcome::Completed(report) if report.apply_backoff => Err(report
            .error
            .unwrap_or(SecretSyncError::TargetsFailed(report.failed))),
        RunOutcome::Completed(report) => Ok(Action::requeue(report.requeue_after)),
    }
}

/// Failed runs come back after the request's own interval
fn error_policy(request: Arc<SecretSync>, error: &SecretSyncError, ctx: Arc<Context>) -> Action {
    error!("Reconciliation error for {}: {}", request.key(), error);
    Action::requeue(
        request
            .spec
            .sync_interval_or(ctx.engine.settings().default_sync_interval),
    )
}

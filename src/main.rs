// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use prometheus::Registry;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use secretsync::config::Config;
use secretsync::kubernetes::{wait_for_secret_sync_crd, KubeBackend};
use secretsync::metrics::Metrics;
use secretsync::reconcilers::SecretSyncReconciler;
use secretsync::server::{start_server, ServerState};
use secretsync::sync::{EngineSettings, SyncEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting SecretSync controller");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: controller_id={}, default_sync_interval={:?}, apply_concurrency={}",
        config.controller_id, config.default_sync_interval, config.apply_concurrency
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for SecretSync CRD to become available...");
    wait_for_secret_sync_crd(&client).await?;

    let metrics = Metrics::register(Registry::new())?;
    let is_ready = Arc::new(AtomicBool::new(false));

    let backend = KubeBackend::new(client.clone(), config.controller_id.clone());
    let engine = SyncEngine::new(
        Arc::new(backend),
        Arc::new(metrics.clone()),
        EngineSettings::from(&config),
    );
    let reconciler = SecretSyncReconciler::new(client, engine, is_ready.clone());

    let server_state = Arc::new(ServerState { metrics, is_ready });

    // Either task ending stops the process
    tokio::select! {
        res = start_server(config.metrics_port, server_state) => res?,
        res = reconciler.run() => res?,
    }

    info!("SecretSync controller exited");
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{NAME, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{Api, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the SecretSync CRD to be installed.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_secret_sync_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match secret_sync_crd_exists(client).await {
            Ok(true) => {
                info!("CRD {} is available", NAME);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "CRD {} not yet available, waiting {} seconds...",
                    NAME, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for CRD {}: {}, retrying in {} seconds...",
                    NAME, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check whether the SecretSync CustomResourceDefinition exists
pub async fn secret_sync_crd_exists(client: &Client) -> Result<bool> {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    Ok(crds.get_opt(NAME).await?.is_some())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capability implementations backed by the Kubernetes API

use crate::error::Result;
use crate::sync::store::{SecretStore, SyncRequestStore};
use crate::types::{SecretSync, SecretSyncStatus};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ListParams, Patch, PatchParams, PostParams},
    Api, Client, ResourceExt,
};
use serde_json::json;
use tracing::{debug, instrument};

/// Talks to the API server with the controller's own identity
#[derive(Clone)]
pub struct KubeBackend {
    pub(crate) client: Client,
    field_manager: String,
}

impl KubeBackend {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SecretStore for KubeBackend {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(secrets.get_opt(name).await?)
    }

    #[instrument(skip(self, secret), fields(name = %secret.name_any()))]
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets.create(&self.post_params(), secret).await?;
        debug!("Created secret");
        Ok(())
    }

    #[instrument(skip(self, secret), fields(name = %secret.name_any()))]
    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets
            .replace(&secret.name_any(), &self.post_params(), secret)
            .await?;
        debug!("Replaced secret");
        Ok(())
    }
}

#[async_trait]
impl SyncRequestStore for KubeBackend {
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<SecretSync>> {
        let requests: Api<SecretSync> = Api::namespaced(self.client.clone(), namespace);
        Ok(requests.get_opt(name).await?)
    }

    async fn list_requests(&self) -> Result<Vec<SecretSync>> {
        let requests: Api<SecretSync> = Api::all(self.client.clone());
        Ok(requests.list(&ListParams::default()).await?.items)
    }

    #[instrument(skip(self, request, status), fields(request = %request.key()))]
    async fn write_status(&self, request: &SecretSync, status: &SecretSyncStatus) -> Result<()> {
        let requests: Api<SecretSync> =
            Api::namespaced(self.client.clone(), &request.namespace().unwrap_or_default());
        let patch = json!({ "status": status });
        requests
            .patch_status(
                &request.name_any(),
                &PatchParams::default(),
                &Patch::Merge(&patch),
            )
            .await?;
        Ok(())
    }
}

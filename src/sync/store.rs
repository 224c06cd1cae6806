// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capabilities the sync engine needs from the cluster.

use crate::error::Result;
use crate::types::{SecretSync, SecretSyncStatus};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};

/// Read and write access to secrets by coordinates
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` when the secret does not exist
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()>;

    /// Replace the whole object, guarded by its `resourceVersion`
    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<()>;
}

/// Listing of all namespaces together with their labels
#[async_trait]
pub trait NamespaceLister: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;
}

/// Access to SecretSync objects and their status subresource
#[async_trait]
pub trait SyncRequestStore: Send + Sync {
    /// `Ok(None)` when the request has been deleted
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<SecretSync>>;

    async fn list_requests(&self) -> Result<Vec<SecretSync>>;

    async fn write_status(&self, request: &SecretSync, status: &SecretSyncStatus) -> Result<()>;
}

/// Everything a reconciliation run talks to
pub trait Backend: SecretStore + NamespaceLister + SyncRequestStore {}

impl<T> Backend for T where T: SecretStore + NamespaceLister + SyncRequestStore {}

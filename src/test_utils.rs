// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock API server for the kube client and an in-memory
//! cluster implementing the sync capabilities.

use crate::error::{Result, SecretSyncError};
use crate::sync::store::{NamespaceLister, SecretStore, SyncRequestStore};
use crate::types::{SecretSync, SecretSyncSpec, SecretSyncStatus};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::Client;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<
            dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>>
                + Send,
        >,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response
                .unwrap_or_else(|| (404, not_found_json("path", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

pub fn forbidden(message: &str) -> SecretSyncError {
    SecretSyncError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "Forbidden".to_string(),
        code: 403,
    }))
}

pub fn make_secret(namespace: &str, name: &str, data: &[(&str, &str)], type_: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        type_: Some(type_.to_string()),
        ..Default::default()
    }
}

pub fn make_namespace(name: &str, labels: &[(&str, &str)]) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: if labels.is_empty() {
                None
            } else {
                Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn make_request(namespace: &str, name: &str, spec: SecretSyncSpec) -> SecretSync {
    let mut request = SecretSync::new(name, spec);
    request.metadata.namespace = Some(namespace.to_string());
    request
}

pub fn source_spec(namespace: &str, name: &str) -> SecretSyncSpec {
    SecretSyncSpec {
        source_namespace: namespace.to_string(),
        source_secret_name: name.to_string(),
        target_namespace_selector: None,
        target_secret_name: None,
        target_namespaces: vec![],
        sync_interval: None,
    }
}

#[derive(Default)]
struct ClusterState {
    secrets: BTreeMap<(String, String), Secret>,
    namespaces: Vec<Namespace>,
    requests: BTreeMap<(String, String), SecretSync>,
    statuses: Vec<SecretSyncStatus>,
    creates: usize,
    replaces: usize,
    namespace_lists: usize,
    failing_writes: HashSet<String>,
    failing_reads: HashSet<String>,
    fail_status: bool,
}

/// In-memory cluster implementing every capability the engine consumes
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.state.lock().unwrap().secrets.insert(key, secret);
        self
    }

    pub fn with_namespace(self, namespace: Namespace) -> Self {
        self.state.lock().unwrap().namespaces.push(namespace);
        self
    }

    pub fn with_request(self, request: SecretSync) -> Self {
        let key = (
            request.metadata.namespace.clone().unwrap_or_default(),
            request.metadata.name.clone().unwrap_or_default(),
        );
        self.state.lock().unwrap().requests.insert(key, request);
        self
    }

    /// Make every create/replace in `namespace` fail with 403
    pub fn deny_writes_in(self, namespace: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_writes
            .insert(namespace.to_string());
        self
    }

    /// Make every get in `namespace` fail with 403
    pub fn deny_reads_in(self, namespace: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_reads
            .insert(namespace.to_string());
        self
    }

    pub fn fail_status_writes(self) -> Self {
        self.state.lock().unwrap().fail_status = true;
        self
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn insert_secret(&self, secret: Secret) {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.state.lock().unwrap().secrets.insert(key, secret);
    }

    pub fn remove_secret(&self, namespace: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .secrets
            .remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn set_namespace_labels(&self, name: &str, labels: &[(&str, &str)]) {
        let mut state = self.state.lock().unwrap();
        state.namespaces.retain(|n| n.metadata.name.as_deref() != Some(name));
        state.namespaces.push(make_namespace(name, labels));
    }

    pub fn writes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.creates + state.replaces
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn replaces(&self) -> usize {
        self.state.lock().unwrap().replaces
    }

    pub fn namespace_lists(&self) -> usize {
        self.state.lock().unwrap().namespace_lists
    }

    /// Every status written so far, oldest first
    pub fn statuses(&self) -> Vec<SecretSyncStatus> {
        self.state.lock().unwrap().statuses.clone()
    }

    fn check_write(&self, namespace: &str) -> Result<()> {
        if self.state.lock().unwrap().failing_writes.contains(namespace) {
            return Err(forbidden(&format!(
                "secrets is forbidden in namespace {}",
                namespace
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for FakeCluster {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let state = self.state.lock().unwrap();
        if state.failing_reads.contains(namespace) {
            return Err(forbidden("secrets is forbidden"));
        }
        Ok(state
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        self.check_write(namespace)?;
        let mut state = self.state.lock().unwrap();
        let key = (
            namespace.to_string(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        if state.secrets.contains_key(&key) {
            return Err(SecretSyncError::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: "already exists".to_string(),
                reason: "AlreadyExists".to_string(),
                code: 409,
            })));
        }
        let mut stored = secret.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.resource_version = Some("1".to_string());
        state.secrets.insert(key, stored);
        state.creates += 1;
        Ok(())
    }

    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        self.check_write(namespace)?;
        let mut state = self.state.lock().unwrap();
        let key = (
            namespace.to_string(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        state.secrets.insert(key, secret.clone());
        state.replaces += 1;
        Ok(())
    }
}

#[async_trait]
impl NamespaceLister for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let mut state = self.state.lock().unwrap();
        state.namespace_lists += 1;
        Ok(state.namespaces.clone())
    }
}

#[async_trait]
impl SyncRequestStore for FakeCluster {
    async fn get_request(&self, namespace: &str, name: &str) -> Result<Option<SecretSync>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .requests
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_requests(&self) -> Result<Vec<SecretSync>> {
        Ok(self.state.lock().unwrap().requests.values().cloned().collect())
    }

    async fn write_status(&self, request: &SecretSync, status: &SecretSyncStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_status {
            return Err(SecretSyncError::StatusPersist("status update rejected".to_string()));
        }
        state.statuses.push(status.clone());
        let key = (
            request.metadata.namespace.clone().unwrap_or_default(),
            request.metadata.name.clone().unwrap_or_default(),
        );
        if let Some(stored) = state.requests.get_mut(&key) {
            stored.status = Some(status.clone());
        }
        Ok(())
    }
}

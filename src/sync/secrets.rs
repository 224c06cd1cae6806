// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Diffing and writing of a single destination secret

use crate::constants::{annotations, labels};
use crate::error::{Result, SecretSyncError};
use crate::sync::store::SecretStore;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{api::ObjectMeta, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// What applying the source to one destination did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Created,
    Updated,
    Unchanged,
}

/// Identity stamped onto every destination
#[derive(Debug, Clone)]
pub struct Ownership<'a> {
    /// Value of the managed-by label
    pub controller_id: &'a str,
    /// `<namespace>/<name>` of the SecretSync
    pub request: &'a str,
}

/// Bring the secret `name` in `namespace` in line with `source`.
///
/// Creates it when missing, replaces `data` and `type` when either differs,
/// and issues no write when both already match.
#[instrument(
    skip(store, source, owner),
    fields(source = %format!("{}/{}", source.namespace().unwrap_or_default(), source.name_any()))
)]
pub async fn apply_secret(
    store: &(impl SecretStore + ?Sized),
    source: &Secret,
    namespace: &str,
    name: &str,
    owner: &Ownership<'_>,
) -> Result<ApplyResult> {
    if namespace.is_empty() {
        return Err(SecretSyncError::InvalidTarget(namespace.to_string()));
    }

    let read_error = |err: SecretSyncError| match err {
        SecretSyncError::KubeError(e) => SecretSyncError::DestinationRead {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source: e,
        },
        other => other,
    };
    let write_error = |err: SecretSyncError| match err {
        SecretSyncError::KubeError(e) => SecretSyncError::DestinationWrite {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source: e,
        },
        other => other,
    };

    match store.get_secret(namespace, name).await.map_err(read_error)? {
        None => {
            let target = build_target_secret(source, namespace, name, owner);
            store
                .create_secret(namespace, &target)
                .await
                .map_err(write_error)?;
            info!("Created secret {}/{}", namespace, name);
            Ok(ApplyResult::Created)
        }
        Some(existing) if is_in_sync(&existing, source) => {
            debug!("Secret {}/{} is up to date", namespace, name);
            Ok(ApplyResult::Unchanged)
        }
        Some(mut existing) => {
            existing.data = source.data.clone();
            existing.type_ = source.type_.clone();
            stamp_ownership(&mut existing.metadata, source, owner);
            store
                .replace_secret(namespace, &existing)
                .await
                .map_err(write_error)?;
            info!("Updated secret {}/{}", namespace, name);
            Ok(ApplyResult::Updated)
        }
    }
}

/// Whether `target` already carries the source's data and type.
/// Absent data counts as empty data.
pub fn is_in_sync(target: &Secret, source: &Secret) -> bool {
    let empty = BTreeMap::<String, ByteString>::new();
    let target_data = target.data.as_ref().unwrap_or(&empty);
    let source_data = source.data.as_ref().unwrap_or(&empty);
    target_data == source_data && target.type_ == source.type_
}

/// Build a fresh destination secret carrying the source content
fn build_target_secret(
    source: &Secret,
    namespace: &str,
    name: &str,
    owner: &Ownership<'_>,
) -> Secret {
    let mut metadata = ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    };
    stamp_ownership(&mut metadata, source, owner);

    Secret {
        metadata,
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Default::default()
    }
}

fn stamp_ownership(metadata: &mut ObjectMeta, source: &Secret, owner: &Ownership<'_>) {
    let labels = metadata.labels.get_or_insert_with(BTreeMap::new);
    labels.insert(labels::MANAGED_BY.to_string(), owner.controller_id.to_string());
    labels.insert(
        labels::SOURCE_NAMESPACE.to_string(),
        source.namespace().unwrap_or_default(),
    );
    labels.insert(labels::SOURCE_NAME.to_string(), source.name_any());

    metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(annotations::REQUEST.to_string(), owner.request.to_string());
}

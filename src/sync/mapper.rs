// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mapping of watched Secret and Namespace changes to the SecretSyncs
//! that must run again.

use crate::selector::{matches, Selector};
use crate::types::SecretSync;
use kube::runtime::reflector::ObjectRef;
use kube::{Resource, ResourceExt};
use std::sync::Arc;
use tracing::debug;

fn is_kind<K>(kind: &str) -> bool
where
    K: Resource,
    K::DynamicType: Default,
{
    K::kind(&K::DynamicType::default()) == kind
}

/// Requests whose source is the changed secret.
///
/// Anything that is not a namespaced Secret yields nothing.
pub fn requests_for_source<K>(obj: &K, requests: &[Arc<SecretSync>]) -> Vec<ObjectRef<SecretSync>>
where
    K: Resource,
    K::DynamicType: Default,
{
    if !is_kind::<K>("Secret") {
        return Vec::new();
    }
    let meta = obj.meta();
    let (Some(namespace), Some(name)) = (meta.namespace.as_deref(), meta.name.as_deref()) else {
        return Vec::new();
    };

    let refs: Vec<_> = requests
        .iter()
        .filter(|r| r.spec.is_source(namespace, name))
        .map(|r| ObjectRef::from_obj(r.as_ref()))
        .collect();

    if !refs.is_empty() {
        debug!(
            "Secret {}/{} is the source of {} SecretSync(s)",
            namespace,
            name,
            refs.len()
        );
    }
    refs
}

/// Requests that list the changed namespace explicitly or whose selector
/// matches its current labels.
///
/// Anything that is not a Namespace yields nothing. Requests with an
/// invalid selector only match through their explicit list.
pub fn requests_for_location<K>(obj: &K, requests: &[Arc<SecretSync>]) -> Vec<ObjectRef<SecretSync>>
where
    K: Resource,
    K::DynamicType: Default,
{
    if !is_kind::<K>("Namespace") {
        return Vec::new();
    }
    let Some(name) = obj.meta().name.as_deref() else {
        return Vec::new();
    };
    let labels = obj.labels();

    let refs: Vec<_> = requests
        .iter()
        .filter(|r| {
            r.spec.target_namespaces.iter().any(|t| t == name)
                || r.spec
                    .target_namespace_selector
                    .as_ref()
                    .and_then(|s| Selector::parse(s).ok())
                    .is_some_and(|s| matches(&s, labels))
        })
        .map(|r| ObjectRef::from_obj(r.as_ref()))
        .collect();

    if !refs.is_empty() {
        debug!("Namespace {} is targeted by {} SecretSync(s)", name, refs.len());
    }
    refs
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of the namespaces a SecretSync writes to

use crate::error::Result;
use crate::selector::{matches, Selector};
use crate::sync::store::NamespaceLister;
use crate::types::SecretSyncSpec;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Union of the explicit names and every namespace matched by `selector`.
///
/// Explicit names are taken verbatim, without checking that they exist.
/// An absent selector matches nothing.
pub fn effective_targets(
    explicit: &[String],
    selector: Option<&Selector>,
    namespaces: &[Namespace],
) -> BTreeSet<String> {
    let mut targets: BTreeSet<String> = explicit.iter().cloned().collect();

    if let Some(selector) = selector {
        targets.extend(
            namespaces
                .iter()
                .filter(|ns| matches(selector, ns.labels()))
                .map(|ns| ns.name_any()),
        );
    }

    targets
}

/// Compute the effective target set of `spec`, listing namespaces only
/// when a selector is present.
#[instrument(skip(lister, spec))]
pub async fn resolve_targets(
    lister: &(impl NamespaceLister + ?Sized),
    spec: &SecretSyncSpec,
) -> Result<BTreeSet<String>> {
    let selector = spec
        .target_namespace_selector
        .as_ref()
        .map(Selector::parse)
        .transpose()?;

    let namespaces = match &selector {
        Some(selector) => {
            debug!("Listing namespaces for selector {:?}", selector.to_string());
            lister.list_namespaces().await?
        }
        None => Vec::new(),
    };

    let targets = effective_targets(&spec.target_namespaces, selector.as_ref(), &namespaces);
    debug!("Resolved {} target namespaces", targets.len());
    Ok(targets)
}

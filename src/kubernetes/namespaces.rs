// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace listing

use crate::error::Result;
use crate::kubernetes::backend::KubeBackend;
use crate::sync::store::NamespaceLister;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api};
use tracing::{debug, instrument};

#[async_trait]
impl NamespaceLister for KubeBackend {
    /// List every namespace with its labels; selection happens client side
    #[instrument(skip(self))]
    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        debug!("Listed {} namespaces", list.items.len());
        Ok(list.items)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API access: the capability backend and CRD discovery.

pub mod backend;
pub mod crd;
pub mod namespaces;

pub use backend::KubeBackend;
pub use crd::wait_for_secret_sync_crd;

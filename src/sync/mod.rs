// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret replication logic.

pub mod engine;
pub mod mapper;
pub mod secrets;
pub mod status;
pub mod store;
pub mod targets;

pub use engine::{EngineSettings, RunClassification, RunOutcome, RunReport, SyncEngine};
pub use mapper::{requests_for_location, requests_for_source};
pub use secrets::{apply_secret, ApplyResult, Ownership};
pub use status::{SyncResult, SyncSummary};
pub use store::{Backend, NamespaceLister, SecretStore, SyncRequestStore};
pub use targets::resolve_targets;

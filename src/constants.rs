// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys stamped onto every destination secret
pub mod labels {
    /// Identifies the controller instance that owns the destination
    pub const MANAGED_BY: &str = "secretsync.example.com/managed-by";
    /// Namespace of the source secret
    pub const SOURCE_NAMESPACE: &str = "secretsync.example.com/source-namespace";
    /// Name of the source secret
    pub const SOURCE_NAME: &str = "secretsync.example.com/source-name";
}

/// Annotation keys stamped onto every destination secret
pub mod annotations {
    /// `<namespace>/<name>` of the SecretSync that wrote the destination
    pub const REQUEST: &str = "secretsync.example.com/request";
}

/// Default controller id, used as managed-by value and field manager
pub const CONTROLLER_NAME: &str = "secretsync-controller";

/// Default number of seconds between two runs of the same SecretSync
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 180;

/// Upper bound of any sync interval, keeps requeue deadlines schedulable
pub const MAX_SYNC_INTERVAL_SECS: u64 = 86_400;

/// Default number of destinations processed in parallel within one run
pub const DEFAULT_APPLY_CONCURRENCY: usize = 4;

/// Default port of the metrics and probe endpoint
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// CRD polling configuration
pub mod crd {
    /// Name of the SecretSync CustomResourceDefinition
    pub const NAME: &str = "secretsyncs.sync.example.com";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

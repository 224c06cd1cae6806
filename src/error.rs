// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretSyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    #[error("Source secret {namespace}/{name} unavailable: {reason}")]
    SourceUnavailable {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("Invalid namespace selector: {0}")]
    SelectorSyntax(String),

    #[error("Invalid target namespace: {0:?}")]
    InvalidTarget(String),

    #[error("Failed to read secret {name} in namespace {namespace}: {source}")]
    DestinationRead {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to write secret {name} in namespace {namespace}: {source}")]
    DestinationWrite {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to persist status: {0}")]
    StatusPersist(String),

    #[error("{} target namespace(s) failed to sync: {}", .0.len(), .0.join(", "))]
    TargetsFailed(Vec<String>),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, SecretSyncError>;

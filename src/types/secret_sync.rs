// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::MAX_SYNC_INTERVAL_SECS;
use crate::error::{Result, SecretSyncError};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, Time};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Replicates one source secret into a dynamic set of namespaces.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "sync.example.com", version = "v1", kind = "SecretSync")]
#[kube(namespaced)]
#[kube(status = "SecretSyncStatus")]
#[kube(shortname = "ssync")]
#[kube(printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.sourceSecretName"}"#)]
#[kube(printcolumn = r#"{"name":"Last Sync","type":"date","jsonPath":".status.lastSyncTime"}"#)]
#[serde(rename_all = "camelCase")]
pub struct SecretSyncSpec {
    pub source_namespace: String,
    pub source_secret_name: String,
    /// Namespaces whose labels match are added to the targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace_selector: Option<LabelSelector>,
    /// Name of the destination secrets, defaults to the source name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_namespaces: Vec<String>,
    /// Seconds between two runs, defaults to 180, at most one day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(max = 86400))]
    pub sync_interval: Option<i64>,
}

impl SecretSyncSpec {
    /// Reject specs that cannot name a source secret
    pub fn validate(&self) -> Result<()> {
        if self.source_namespace.is_empty() || self.source_secret_name.is_empty() {
            return Err(SecretSyncError::InvalidSpec(
                "sourceNamespace and sourceSecretName must both be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured interval, or `default` when unset or not positive.
    /// Capped at `MAX_SYNC_INTERVAL_SECS`.
    pub fn sync_interval_or(&self, default: Duration) -> Duration {
        let interval = match self.sync_interval {
            Some(secs) if secs > 0 => Duration::from_secs(secs.unsigned_abs()),
            _ => default,
        };
        interval.min(Duration::from_secs(MAX_SYNC_INTERVAL_SECS))
    }

    /// Destination object name for a given source secret name
    pub fn target_name<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.target_secret_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(source_name)
    }

    pub fn is_source(&self, namespace: &str, name: &str) -> bool {
        self.source_namespace == namespace && self.source_secret_name == name
    }
}

impl SecretSync {
    /// `<namespace>/<name>` of this request, used in logs and annotations
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }
}

/// Result of the most recent run. Replaced wholesale on every run.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSyncStatus {
    #[serde(default)]
    pub synced_namespaces: Vec<String>,
    #[serde(default)]
    pub failed_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<Time>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    fn make_spec(namespace: &str, name: &str) -> SecretSyncSpec {
        SecretSyncSpec {
            source_namespace: namespace.to_string(),
            source_secret_name: name.to_string(),
            target_namespace_selector: None,
            target_secret_name: None,
            target_namespaces: vec![],
            sync_interval: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_source() {
        assert!(make_spec("default", "db-creds").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let err = make_spec("", "db-creds").validate().unwrap_err();
        assert!(matches!(err, SecretSyncError::InvalidSpec(_)));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(make_spec("default", "").validate().is_err());
    }

    #[test]
    fn test_sync_interval_defaults() {
        let default = Duration::from_secs(180);
        let mut spec = make_spec("default", "db-creds");
        assert_eq!(spec.sync_interval_or(default), default);

        spec.sync_interval = Some(0);
        assert_eq!(spec.sync_interval_or(default), default);

        spec.sync_interval = Some(-5);
        assert_eq!(spec.sync_interval_or(default), default);

        spec.sync_interval = Some(30);
        assert_eq!(spec.sync_interval_or(default), Duration::from_secs(30));
    }

    #[test]
    fn test_sync_interval_is_capped_at_one_day() {
        let one_day = Duration::from_secs(MAX_SYNC_INTERVAL_SECS);
        let mut spec = make_spec("default", "db-creds");

        spec.sync_interval = Some(100_000_000);
        assert_eq!(spec.sync_interval_or(Duration::from_secs(180)), one_day);

        spec.sync_interval = Some(i64::MAX);
        assert_eq!(spec.sync_interval_or(Duration::from_secs(180)), one_day);

        spec.sync_interval = None;
        assert_eq!(spec.sync_interval_or(Duration::from_secs(10_000_000)), one_day);

        spec.sync_interval = Some(86_400);
        assert_eq!(spec.sync_interval_or(Duration::from_secs(180)), one_day);
    }

    #[test]
    fn test_target_name_fallback() {
        let mut spec = make_spec("default", "db-creds");
        assert_eq!(spec.target_name("db-creds"), "db-creds");

        spec.target_secret_name = Some(String::new());
        assert_eq!(spec.target_name("db-creds"), "db-creds");

        spec.target_secret_name = Some("app-db".to_string());
        assert_eq!(spec.target_name("db-creds"), "app-db");
    }

    #[test]
    fn test_spec_wire_format() {
        let spec: SecretSyncSpec = serde_json::from_value(serde_json::json!({
            "sourceNamespace": "default",
            "sourceSecretName": "db-creds",
            "targetNamespaces": ["staging"],
            "targetNamespaceSelector": {"matchLabels": {"env": "prod"}},
            "targetSecretName": "copied",
            "syncInterval": 60
        }))
        .unwrap();

        assert_eq!(spec.target_namespaces, vec!["staging".to_string()]);
        assert_eq!(spec.target_secret_name.as_deref(), Some("copied"));
        assert_eq!(spec.sync_interval, Some(60));
        assert!(spec.target_namespace_selector.is_some());
    }

    #[test]
    fn test_status_always_serializes_both_lists() {
        let value = serde_json::to_value(SecretSyncStatus::default()).unwrap();
        assert_eq!(value["syncedNamespaces"], serde_json::json!([]));
        assert_eq!(value["failedNamespaces"], serde_json::json!([]));
    }

    #[test]
    fn test_crd_metadata() {
        let crd = SecretSync::crd();
        assert_eq!(crd.metadata.name.as_deref(), Some("secretsyncs.sync.example.com"));
        assert_eq!(crd.spec.scope, "Namespaced");
    }

    #[test]
    fn test_crd_bounds_sync_interval() {
        let crd = serde_json::to_value(SecretSync::crd()).unwrap();
        let spec = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]["spec"];
        let interval = &spec["properties"]["syncInterval"];
        assert_eq!(interval["maximum"].as_f64(), Some(86_400.0));
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{
    CONTROLLER_NAME, DEFAULT_APPLY_CONCURRENCY, DEFAULT_METRICS_PORT, DEFAULT_SYNC_INTERVAL_SECS,
};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Value of the managed-by label and field manager for writes
    pub controller_id: String,
    /// Interval used when a SecretSync does not set `syncInterval`
    pub default_sync_interval: Duration,
    /// Destinations processed in parallel within one run
    pub apply_concurrency: usize,
    pub metrics_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller_id: CONTROLLER_NAME.to_string(),
            default_sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            apply_concurrency: DEFAULT_APPLY_CONCURRENCY,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let controller_id = lookup("CONTROLLER_ID")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.controller_id);

        let default_sync_interval = parse_var(&lookup, "DEFAULT_SYNC_INTERVAL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_sync_interval);

        let apply_concurrency: usize = parse_var(&lookup, "APPLY_CONCURRENCY")?
            .unwrap_or(defaults.apply_concurrency)
            .max(1);

        let metrics_port =
            parse_var(&lookup, "METRICS_PORT")?.unwrap_or(defaults.metrics_port);

        Ok(Config {
            controller_id,
            default_sync_interval,
            apply_concurrency,
            metrics_port,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value: {:?}", key, raw))
        })
        .transpose()
}

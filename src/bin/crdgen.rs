// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prints the SecretSync CustomResourceDefinition as YAML.

use kube::CustomResourceExt;
use secretsync::types::SecretSync;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&SecretSync::crd())?);
    Ok(())
}

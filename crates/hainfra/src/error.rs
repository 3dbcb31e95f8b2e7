//! Error types for the HA harness

use crate::outputs::OutputField;
use hainfra_config::ConfigError;
use hainfra_terraform::TerraformError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("total_has must be at least 1, got {0}")]
    InvalidCount(u32),

    #[error("provisioning failed: {0}")]
    Terraform(#[from] TerraformError),

    #[error("terraform returned an empty output set")]
    EmptyOutput,

    #[error("HA {instance}: output `{key}` is missing (field {field})")]
    MissingOutput {
        instance: u32,
        field: OutputField,
        key: String,
    },

    #[error("HA {instance}: {field} is not a valid IP address: {value:?}")]
    InvalidAddress {
        instance: u32,
        field: OutputField,
        value: String,
    },

    #[error("failed to write {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {artifact}: {message}")]
    Render {
        artifact: &'static str,
        message: String,
    },

    #[error("{} of {} HA instance(s) failed:{}", .failures.len(), .total, summarize(.failures))]
    InstancesFailed {
        total: u32,
        failures: Vec<InstanceFailure>,
    },
}

/// Failure of a single HA instance during materialization
#[derive(Debug)]
pub struct InstanceFailure {
    pub index: u32,
    pub error: HaError,
}

impl fmt::Display for InstanceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HA {}: {}", self.index, self.error)
    }
}

fn summarize(failures: &[InstanceFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  - {}", failure.error))
        .collect()
}

pub type Result<T> = std::result::Result<T, HaError>;

//! Terraform wrapper error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("terraform binary `{0}` not found. Install Terraform or set terraform.binary")]
    NotFound(String),

    #[error("terraform working directory not found: {0}")]
    WorkingDirNotFound(PathBuf),

    #[error("terraform {command} failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("terraform {command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("could not decode terraform output `{output}` as a flat string map: {source}\nraw output: {raw}")]
    OutputParse {
        output: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid variable name: {0}")]
    InvalidVariable(String),

    #[error("invalid retry pattern: {0}")]
    InvalidRetryPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerraformError>;

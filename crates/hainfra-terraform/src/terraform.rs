//! terraform CLI wrapper
//!
//! Wraps the terraform commands the harness needs: init, apply, output and destroy.

use crate::error::{Result, TerraformError};
use crate::output::OutputSet;
use crate::provider::Provisioner;
use crate::request::ProvisioningRequest;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const TFVARS_FILE: &str = "terraform.tfvars";
pub const DEFAULT_OUTPUT_NAME: &str = "flat_outputs";

/// terraform CLI wrapper bound to one module directory
pub struct Terraform {
    binary: String,
    working_dir: PathBuf,
    output_name: String,
    timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl Terraform {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: "terraform".to_string(),
            working_dir: working_dir.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            timeout: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Use a different executable, e.g. `tofu` or an absolute path
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Name of the module output holding the flat address map
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Kill any single terraform command running longer than this
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn tfvars_path(&self) -> PathBuf {
        self.working_dir.join(TFVARS_FILE)
    }

    /// Write the request's variables to `terraform.tfvars` in the module directory
    pub async fn write_tfvars(&self, request: &ProvisioningRequest) -> Result<PathBuf> {
        self.ensure_working_dir()?;
        let path = self.tfvars_path();
        tokio::fs::write(&path, request.to_tfvars()?).await?;
        tracing::debug!(
            "Wrote {} variables to {}",
            request.effective_variables().len(),
            path.display()
        );
        Ok(path)
    }

    pub async fn init(&self) -> Result<()> {
        self.run_with_retry(&["init", "-input=false", "-no-color"])
            .await?;
        Ok(())
    }

    pub async fn apply_changes(&self) -> Result<()> {
        self.run_with_retry(&["apply", "-input=false", "-auto-approve", "-no-color"])
            .await?;
        Ok(())
    }

    pub async fn destroy_all(&self) -> Result<()> {
        self.run_with_retry(&["destroy", "-input=false", "-auto-approve", "-no-color"])
            .await?;
        Ok(())
    }

    /// Read and decode the configured output
    pub async fn output(&self) -> Result<OutputSet> {
        let raw = self
            .run_with_retry(&["output", "-no-color", "-json", self.output_name.as_str()])
            .await?;
        OutputSet::parse(&self.output_name, &raw)
    }

    fn ensure_working_dir(&self) -> Result<()> {
        if !self.working_dir.is_dir() {
            return Err(TerraformError::WorkingDirNotFound(self.working_dir.clone()));
        }
        Ok(())
    }

    /// Run a command, retrying while the retry policy recognizes the failure as transient
    async fn run_with_retry(&self, args: &[&str]) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.run_command(args).await {
                Err(TerraformError::CommandFailed { ref stderr, .. })
                    if self.retry.allows_another(attempt) && self.retry.is_retryable(stderr) =>
                {
                    tracing::warn!(
                        "terraform {} hit a transient error (attempt {}/{}), retrying in {:?}",
                        args.first().copied().unwrap_or_default(),
                        attempt,
                        self.retry.max_attempts,
                        self.retry.delay
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Run a terraform command in the module directory and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        self.ensure_working_dir()?;
        let subcommand = args.first().copied().unwrap_or_default().to_string();

        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd.current_dir(&self.working_dir);
        cmd.env("TF_IN_AUTOMATION", "1");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            "Running: {} {} (in {})",
            self.binary,
            args.join(" "),
            self.working_dir.display()
        );

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TerraformError::NotFound(self.binary.clone()),
            _ => TerraformError::IoError(e),
        })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| TerraformError::Timeout {
                    command: subcommand.clone(),
                    timeout,
                })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TerraformError::CommandFailed {
                command: subcommand,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl Provisioner for Terraform {
    fn name(&self) -> &str {
        "terraform"
    }

    async fn apply(&self, request: &ProvisioningRequest) -> Result<OutputSet> {
        tracing::info!(
            "Applying {} HA instance(s) in {}",
            request.count,
            self.working_dir.display()
        );
        self.write_tfvars(request).await?;
        self.init().await?;
        self.apply_changes().await?;
        self.output().await
    }

    async fn outputs(&self) -> Result<OutputSet> {
        self.output().await
    }

    async fn destroy(&self, request: &ProvisioningRequest) -> Result<()> {
        tracing::info!("Destroying resources in {}", self.working_dir.display());
        self.write_tfvars(request).await?;
        self.init().await?;
        self.destroy_all().await
    }
}

//! Provision all HA instances in one apply and turn the outputs into bundles

use crate::artifact::{ArtifactWriter, InstanceBundle, instance_dir};
use crate::cleanup::{CleanupReport, cleanup_instances, cleanup_terraform_state};
use crate::error::{HaError, InstanceFailure, Result};
use crate::outputs::InstanceAddresses;
use hainfra_config::ConfigBundle;
use hainfra_terraform::{OutputSet, Provisioner, ProvisioningRequest};

/// Request for every instance of the run: `tf_vars` plus the instance count
pub fn provisioning_request(config: &ConfigBundle) -> ProvisioningRequest {
    ProvisioningRequest::new(config.total_has).with_variables(
        config
            .tf_vars
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    )
}

/// Outcome of materializing every instance of an output set
#[derive(Debug)]
pub struct ProvisionReport {
    pub total: u32,
    pub bundles: Vec<InstanceBundle>,
    pub failures: Vec<InstanceFailure>,
}

impl ProvisionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// All bundles, or [`HaError::InstancesFailed`] if any instance failed
    pub fn into_result(self) -> Result<Vec<InstanceBundle>> {
        if self.failures.is_empty() {
            Ok(self.bundles)
        } else {
            Err(HaError::InstancesFailed {
                total: self.total,
                failures: self.failures,
            })
        }
    }
}

pub struct Orchestrator<'a> {
    config: &'a ConfigBundle,
    writer: ArtifactWriter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a ConfigBundle) -> Result<Self> {
        Ok(Self {
            config,
            writer: ArtifactWriter::new()?,
        })
    }

    /// Apply once for all instances, then write a bundle per instance.
    ///
    /// Provisioning failures and an empty output set are returned as `Err`.
    /// Per-instance failures end up in the report.
    pub async fn provision(&self, provisioner: &dyn Provisioner) -> Result<ProvisionReport> {
        if self.config.total_has < 1 {
            return Err(HaError::InvalidCount(self.config.total_has));
        }

        let request = provisioning_request(self.config);
        tracing::info!(
            "Provisioning {} HA instance(s) with {}",
            request.count,
            provisioner.name()
        );
        let outputs = provisioner.apply(&request).await?;
        if outputs.is_empty() {
            return Err(HaError::EmptyOutput);
        }

        Ok(self.materialize(&outputs))
    }

    /// Write bundles for instances `1..=total_has` from an existing output set
    pub fn materialize(&self, outputs: &OutputSet) -> ProvisionReport {
        let total = self.config.total_has;
        let mut report = ProvisionReport {
            total,
            bundles: Vec::new(),
            failures: Vec::new(),
        };

        for index in 1..=total {
            match self.materialize_instance(index, outputs) {
                Ok(bundle) => report.bundles.push(bundle),
                Err(error) => {
                    tracing::error!("HA {} failed: {}", index, error);
                    report.failures.push(InstanceFailure { index, error });
                }
            }
        }

        report
    }

    /// Extract, validate and write one instance. Nothing is written unless every address is valid.
    pub fn materialize_instance(&self, index: u32, outputs: &OutputSet) -> Result<InstanceBundle> {
        let addresses = InstanceAddresses::from_outputs(index, outputs)?;
        addresses.validate()?;

        let dir = instance_dir(&self.config.output_dir, index);
        let bundle = self.writer.write_bundle(
            &dir,
            &addresses,
            &self.config.pem_path,
            &self.config.bootstrap_password,
            &self.config.ha_settings(index),
        )?;

        tracing::info!("HA {} LB: {}", index, bundle.load_balancer);
        Ok(bundle)
    }

    /// Remove every bundle and Terraform's local state. Never fails, see the report.
    pub fn cleanup(&self) -> CleanupReport {
        let mut report = cleanup_instances(&self.config.output_dir, self.config.total_has);
        report.merge(cleanup_terraform_state(&self.config.terraform.dir));
        report
    }

    /// Destroy the infrastructure, then clean up locally.
    ///
    /// A failed destroy aborts before anything is removed so the state file
    /// still tracks the live resources.
    pub async fn teardown(&self, provisioner: &dyn Provisioner) -> Result<CleanupReport> {
        let request = provisioning_request(self.config);
        tracing::info!(
            "Destroying {} HA instance(s) with {}",
            request.count,
            provisioner.name()
        );
        provisioner.destroy(&request).await?;
        Ok(self.cleanup())
    }
}

//! Terraform provisioning client for hainfra
//!
//! Everything the harness does to real infrastructure goes through the
//! [`Provisioner`] trait. [`Terraform`] implements it on top of the
//! `terraform` CLI:
//!
//! - `apply`: write `terraform.tfvars`, `init`, `apply`, then decode the
//!   module's flat output map
//! - `destroy`: `init` + `destroy` against the same state
//!
//! Commands that fail with a known-transient error (API throttling, registry
//! hiccups) are retried according to a [`RetryPolicy`]; anything else, and
//! the last transient failure, is returned to the caller.
//!
//! # Requirements
//!
//! - `terraform` (or a compatible binary such as `tofu`) on `PATH`
//! - Provider credentials supplied through the module variables
//!
//! # Example
//!
//! ```ignore
//! use hainfra_terraform::{ProvisioningRequest, Provisioner, Terraform};
//!
//! let terraform = Terraform::new("../modules/aws");
//! let request = ProvisioningRequest::new(2).with_variable("aws_prefix", "qa");
//!
//! let outputs = terraform.apply(&request).await?;
//! println!("{:?}", outputs.get("ha_1_aws_lb"));
//! ```

pub mod error;
pub mod output;
pub mod provider;
pub mod request;
pub mod retry;
pub mod terraform;

pub use error::{Result, TerraformError};
pub use output::OutputSet;
pub use provider::Provisioner;
pub use request::{ProvisioningRequest, TOTAL_HAS_VAR};
pub use retry::{DEFAULT_RETRYABLE_ERRORS, RetryPolicy};
pub use terraform::{DEFAULT_OUTPUT_NAME, TFVARS_FILE, Terraform};

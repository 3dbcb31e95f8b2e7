//! Rancher HA test infrastructure
//!
//! Provisions N high-availability clusters (three nodes and a load balancer
//! each) with one Terraform apply, then writes a bundle per cluster:
//!
//! ```text
//! <output_dir>/high-availability-<n>/
//!   cluster.yml       node list for the cluster bootstrapper
//!   install.sh        Rancher helm install
//!   cert-manager.sh   cert-manager helm install
//!   cacert.sh         private CA secret
//!   aws_lb.txt        load balancer DNS name
//! ```
//!
//! Teardown destroys the infrastructure and removes the bundles together
//! with Terraform's local state.

pub mod address;
pub mod artifact;
pub mod cleanup;
pub mod error;
pub mod orchestrator;
pub mod outputs;
pub mod scripts;

pub use address::{AddressValidity, is_valid_ip};
pub use artifact::{ArtifactWriter, ClusterDescriptor, ClusterNode, InstanceBundle, instance_dir};
pub use cleanup::{CleanupFailure, CleanupReport, cleanup_instances, cleanup_terraform_state};
pub use error::{HaError, InstanceFailure, Result};
pub use orchestrator::{Orchestrator, ProvisionReport, provisioning_request};
pub use outputs::{InstanceAddresses, NodeAddresses, OutputField};

//! Provisioner trait definition

use crate::error::Result;
use crate::output::OutputSet;
use crate::request::ProvisioningRequest;
use async_trait::async_trait;

/// Infrastructure provisioning abstraction.
///
/// The harness only ever talks to infrastructure through this trait, which
/// keeps the orchestration testable without a real cloud account.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Returns the provisioner name (e.g., "terraform")
    fn name(&self) -> &str;

    /// Create or update every resource in the request and return the outputs
    async fn apply(&self, request: &ProvisioningRequest) -> Result<OutputSet>;

    /// Read the outputs of the current state without changing anything
    async fn outputs(&self) -> Result<OutputSet>;

    /// Tear down everything the request created
    async fn destroy(&self, request: &ProvisioningRequest) -> Result<()>;
}

use super::{print_report, terraform_for};
use anyhow::Context;
use colored::Colorize;
use hainfra::{HaError, Orchestrator};
use hainfra_config::ConfigBundle;
use hainfra_terraform::{OutputSet, Provisioner};
use std::path::Path;

/// Write bundles without applying anything.
///
/// Outputs come from a saved `terraform output -json` document, or from the
/// current state of the module when no file is given.
pub async fn handle(config: &ConfigBundle, outputs_path: Option<&Path>) -> anyhow::Result<()> {
    let outputs = match outputs_path {
        Some(path) => {
            println!(
                "{}",
                format!("Rendering bundles from {}...", path.display()).blue()
            );
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            OutputSet::parse(&config.terraform.output, &raw)?
        }
        None => {
            println!(
                "{}",
                format!(
                    "Rendering bundles from the state in {}...",
                    config.terraform.dir.display()
                )
                .blue()
            );
            terraform_for(config)?
                .outputs()
                .await
                .context("failed to read terraform outputs")?
        }
    };
    if outputs.is_empty() {
        return Err(HaError::EmptyOutput.into());
    }

    let orchestrator = Orchestrator::new(config)?;
    let report = orchestrator.materialize(&outputs);

    print_report(&report);
    let bundles = report.into_result()?;

    println!(
        "{}",
        format!("✓ {} HA bundle(s) written", bundles.len()).green().bold()
    );
    Ok(())
}

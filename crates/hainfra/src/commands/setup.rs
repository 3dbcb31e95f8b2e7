use super::{print_report, terraform_for};
use anyhow::Context;
use colored::Colorize;
use hainfra::Orchestrator;
use hainfra_config::ConfigBundle;

pub async fn handle(config: &ConfigBundle) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Provisioning {} HA instance(s)...", config.total_has).blue()
    );
    println!(
        "Terraform module: {}",
        config.terraform.dir.display().to_string().cyan()
    );

    let terraform = terraform_for(config)?;
    let orchestrator = Orchestrator::new(config)?;
    let report = orchestrator
        .provision(&terraform)
        .await
        .context("provisioning failed")?;

    print_report(&report);
    let bundles = report.into_result()?;

    println!(
        "{}",
        format!("✓ {} HA bundle(s) written", bundles.len()).green().bold()
    );
    Ok(())
}

use super::{print_cleanup_report, terraform_for};
use anyhow::Context;
use colored::Colorize;
use hainfra::Orchestrator;
use hainfra_config::ConfigBundle;

pub async fn handle(config: &ConfigBundle, local_only: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;

    let report = if local_only {
        println!("{}", "Removing local bundles and Terraform state...".yellow());
        orchestrator.cleanup()
    } else {
        println!(
            "{}",
            format!("Destroying {} HA instance(s)...", config.total_has).yellow()
        );
        let terraform = terraform_for(config)?;
        orchestrator
            .teardown(&terraform)
            .await
            .context("destroy failed, local state was left in place")?
    };

    print_cleanup_report(&report);
    if report.is_clean() {
        println!("{}", "✓ Cleanup complete".green().bold());
    } else {
        println!("{}", "Cleanup finished with warnings".yellow().bold());
    }
    Ok(())
}

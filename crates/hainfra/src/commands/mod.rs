pub mod cleanup;
pub mod render;
pub mod setup;
pub mod validate;

use colored::Colorize;
use hainfra::{CleanupReport, ProvisionReport};
use hainfra_config::ConfigBundle;
use hainfra_terraform::{RetryPolicy, Terraform};

/// Terraform wrapper configured from the `terraform` section
pub fn terraform_for(config: &ConfigBundle) -> hainfra_terraform::Result<Terraform> {
    let settings = &config.terraform;
    let retry = RetryPolicy::new(settings.retry_attempts, settings.retry_delay)
        .with_patterns(&settings.retry_patterns)?;
    Ok(Terraform::new(&settings.dir)
        .with_binary(&settings.binary)
        .with_output_name(&settings.output)
        .with_timeout(settings.timeout)
        .with_retry(retry))
}

pub fn print_report(report: &ProvisionReport) {
    println!();
    for bundle in &report.bundles {
        println!(
            "  {} HA {}  LB: {}  ({})",
            "✓".green(),
            bundle.index,
            bundle.load_balancer.cyan(),
            bundle.dir.display()
        );
    }
    for failure in &report.failures {
        println!("  {} {}", "✗".red(), failure);
    }
    println!();
}

pub fn print_cleanup_report(report: &CleanupReport) {
    println!("  removed {} path(s)", report.removed.len());
    if !report.is_clean() {
        println!(
            "{}",
            format!("  {} path(s) could not be removed:", report.failures.len()).yellow()
        );
        for failure in &report.failures {
            println!("    - {}: {}", failure.path.display(), failure.message);
        }
    }
}

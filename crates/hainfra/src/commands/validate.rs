use colored::Colorize;
use hainfra_config::ConfigBundle;
use std::path::Path;

pub fn handle(config_path: &Path, config: &ConfigBundle) -> anyhow::Result<()> {
    println!("{}", "✓ Configuration is valid".green().bold());
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();
    println!("Summary:");
    println!("  HA instances: {}", config.total_has);
    println!("  Output dir:   {}", config.output_dir.display());
    println!("  SSH key:      {}", config.pem_path);
    println!(
        "  Terraform:    {} in {} (output `{}`)",
        config.terraform.binary,
        config.terraform.dir.display(),
        config.terraform.output
    );
    println!(
        "  Retry:        {} attempt(s), {}s apart",
        config.terraform.retry_attempts,
        config.terraform.retry_delay.as_secs()
    );

    for index in 1..=config.total_has {
        let settings = config.ha_settings(index);
        let psp = if settings.psp_enabled {
            "psp on".normal()
        } else {
            "psp off".yellow()
        };
        println!(
            "    - HA {}: rancher {} / chart {} ({})",
            index,
            settings.image.cyan(),
            settings.chart,
            psp
        );
    }

    if !config.tf_vars.is_empty() {
        let names: Vec<&str> = config.tf_vars.keys().map(String::as_str).collect();
        println!("  tf_vars:      {}", names.join(", "));
    }
    Ok(())
}

//! Configuration for the hainfra harness
//!
//! Reads `tool-config.yml`, layers `HAINFRA_*` environment overrides on top
//! and validates the result into a [`ConfigBundle`].

pub mod bundle;
pub mod error;

pub use bundle::{ConfigBundle, HaSection, HaSettings, TerraformSettings, ToolConfig};
pub use error::*;

use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a config file
pub const CONFIG_PATH_ENV: &str = "HAINFRA_CONFIG_PATH";

/// Prefix for environment overrides, e.g. `HAINFRA_RANCHER__BOOTSTRAP_PASSWORD`
pub const ENV_PREFIX: &str = "HAINFRA";

const CANDIDATES: [&str; 3] = ["tool-config.local.yml", "tool-config.yml", "tool-config.yaml"];

/// Locate the tool config file.
///
/// Search order:
/// 1. `HAINFRA_CONFIG_PATH`
/// 2. current directory: tool-config.local.yml, tool-config.yml, tool-config.yaml
/// 3. parent directory, same names (the harness usually runs one level below the repo root)
/// 4. ~/.config/hainfra/tool-config.yml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points at {}, which does not exist",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;
    let mut dirs_to_search = vec![current_dir.clone()];
    if let Some(parent) = current_dir.parent() {
        dirs_to_search.push(parent.to_path_buf());
    }

    for dir in &dirs_to_search {
        for filename in &CANDIDATES {
            let path = dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("hainfra").join("tool-config.yml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Read a config file plus environment overrides without validating it
pub fn load_raw(path: &Path) -> Result<ToolConfig> {
    let load_error = |source| ConfigError::Load {
        path: path.to_path_buf(),
        source,
    };

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(load_error)?;
    let mut raw: ToolConfig = settings.try_deserialize().map_err(load_error)?;

    let document: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(path)?).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
    raw.merge_file_overrides(&document)?;
    Ok(raw)
}

/// Read and validate a config file
pub fn load(path: &Path) -> Result<ConfigBundle> {
    tracing::debug!("Loading config from {}", path.display());
    load_raw(path)?.validate()
}

/// Resolve the config path (explicit or discovered) and load it
pub fn load_from(explicit: Option<&Path>) -> Result<(PathBuf, ConfigBundle)> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => find_config_file()?,
    };
    let bundle = load(&path)?;
    Ok((path, bundle))
}

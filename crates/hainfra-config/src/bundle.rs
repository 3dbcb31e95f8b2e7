//! Raw `tool-config.yml` shape and the validated [`ConfigBundle`].

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";
pub const DEFAULT_TERRAFORM_DIR: &str = "../modules/aws";
pub const DEFAULT_OUTPUT_NAME: &str = "flat_outputs";
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// `tool-config.yml` as written by the user. Every field is optional here;
/// [`ToolConfig::validate`] decides what is actually required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub total_has: i64,
    pub output_dir: Option<PathBuf>,
    pub local: LocalSection,
    pub rancher: RancherSection,
    pub ha_config: HaSection,
    pub ha_overrides: BTreeMap<String, HaSection>,
    pub terraform: TerraformSection,
    pub tf_vars: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalSection {
    pub pem_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RancherSection {
    pub bootstrap_password: Option<String>,
}

/// Chart settings. Used both for `ha_config` and for each `ha_overrides` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HaSection {
    pub image: Option<String>,
    pub chart: Option<String>,
    pub psp_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TerraformSection {
    pub binary: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub delay_secs: Option<u64>,
    /// Extra stderr regexes treated as transient, on top of the built-in list
    pub patterns: Vec<String>,
}

/// Chart settings resolved for one HA instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaSettings {
    pub image: String,
    pub chart: String,
    /// Global pod security policy. When disabled the install script carries
    /// an explicit `psp.enabled=false` override.
    pub psp_enabled: bool,
}

impl HaSection {
    /// Keep the fields set here and take the rest from `fallback`
    fn or(self, fallback: HaSection) -> HaSection {
        HaSection {
            image: self.image.or(fallback.image),
            chart: self.chart.or(fallback.chart),
            psp_enabled: self.psp_enabled.or(fallback.psp_enabled),
        }
    }

    /// Read one `ha_overrides` entry straight from the YAML document
    fn from_yaml(key: &str, value: &Value) -> Result<Self> {
        let invalid = |field: &str, found: &Value| ConfigError::InvalidValue {
            key: format!("ha_overrides.{}.{}", key, field),
            message: format!("unexpected value {:?}", found),
        };
        let text = |field: &str| -> Result<Option<String>> {
            match value.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(Value::Number(n)) => Ok(Some(n.to_string())),
                Some(other) => Err(invalid(field, other)),
            }
        };
        let psp_enabled = match value.get("psp_enabled") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) if s == "true" || s == "false" => Some(s == "true"),
            Some(other) => return Err(invalid("psp_enabled", other)),
        };

        Ok(Self {
            image: text("image")?,
            chart: text("chart")?,
            psp_enabled,
        })
    }
}

impl HaSettings {
    fn overlay(&self, section: &HaSection) -> Self {
        Self {
            image: section.image.clone().unwrap_or_else(|| self.image.clone()),
            chart: section.chart.clone().unwrap_or_else(|| self.chart.clone()),
            psp_enabled: section.psp_enabled.unwrap_or(self.psp_enabled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformSettings {
    pub binary: String,
    pub dir: PathBuf,
    pub output: String,
    pub timeout: Option<Duration>,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub retry_patterns: Vec<String>,
}

impl Default for TerraformSettings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TERRAFORM_BINARY.to_string(),
            dir: PathBuf::from(DEFAULT_TERRAFORM_DIR),
            output: DEFAULT_OUTPUT_NAME.to_string(),
            timeout: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            retry_patterns: Vec::new(),
        }
    }
}

/// Validated configuration for one run.
///
/// Built once at startup and handed to every component by reference.
#[derive(Debug, Clone)]
pub struct ConfigBundle {
    pub total_has: u32,
    pub pem_path: String,
    pub bootstrap_password: String,
    pub ha: HaSettings,
    pub ha_overrides: BTreeMap<u32, HaSection>,
    pub terraform: TerraformSettings,
    pub tf_vars: BTreeMap<String, String>,
    pub output_dir: PathBuf,
}

impl ConfigBundle {
    /// Chart settings for instance `index`, with any `ha_overrides` entry applied
    pub fn ha_settings(&self, index: u32) -> HaSettings {
        match self.ha_overrides.get(&index) {
            Some(section) => self.ha.overlay(section),
            None => self.ha.clone(),
        }
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey(key)),
    }
}

impl ToolConfig {
    /// Merge the `ha_overrides` section as it appears in the file.
    ///
    /// The layered loader only keeps string map keys, so `2:` would vanish
    /// while `"2":` survives. Entries already present (possibly with
    /// environment overrides applied) keep their values; the file fills
    /// whatever they leave unset.
    pub fn merge_file_overrides(&mut self, document: &Value) -> Result<()> {
        let entries = match document.get("ha_overrides") {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Mapping(entries)) => entries,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "ha_overrides".to_string(),
                    message: format!("expected a map keyed by instance index, got {:?}", other),
                });
            }
        };

        for (key, value) in entries {
            let key = match key {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "ha_overrides".to_string(),
                        message: format!("unsupported key {:?}", other),
                    });
                }
            };
            let section = HaSection::from_yaml(&key, value)?;
            match self.ha_overrides.entry(key) {
                Entry::Occupied(mut entry) => {
                    let layered = std::mem::take(entry.get_mut());
                    *entry.get_mut() = layered.or(section);
                }
                Entry::Vacant(entry) => {
                    entry.insert(section);
                }
            }
        }
        Ok(())
    }

    pub fn validate(self) -> Result<ConfigBundle> {
        if self.total_has < 1 {
            return Err(ConfigError::InvalidValue {
                key: "total_has".to_string(),
                message: format!("must be at least 1, got {}", self.total_has),
            });
        }
        let total_has = u32::try_from(self.total_has).map_err(|_| ConfigError::InvalidValue {
            key: "total_has".to_string(),
            message: format!("{} is out of range", self.total_has),
        })?;

        let pem_path = required(self.local.pem_path, "local.pem_path")?;
        let bootstrap_password =
            required(self.rancher.bootstrap_password, "rancher.bootstrap_password")?;
        let ha = HaSettings {
            image: required(self.ha_config.image, "ha_config.image")?,
            chart: required(self.ha_config.chart, "ha_config.chart")?,
            psp_enabled: self.ha_config.psp_enabled.unwrap_or(true),
        };

        let mut ha_overrides = BTreeMap::new();
        for (key, section) in self.ha_overrides {
            let index = key
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|i| (1..=total_has).contains(i))
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: format!("ha_overrides.{}", key),
                    message: format!("expected an instance index in 1..={}", total_has),
                })?;
            ha_overrides.insert(index, section);
        }

        let defaults = TerraformSettings::default();
        let retry_attempts = self
            .terraform
            .retry
            .max_attempts
            .unwrap_or(defaults.retry_attempts);
        if retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "terraform.retry.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let terraform = TerraformSettings {
            binary: self.terraform.binary.unwrap_or(defaults.binary),
            dir: self.terraform.dir.unwrap_or(defaults.dir),
            output: self.terraform.output.unwrap_or(defaults.output),
            timeout: self.terraform.timeout_secs.map(Duration::from_secs),
            retry_attempts,
            retry_delay: self
                .terraform
                .retry
                .delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
            retry_patterns: self.terraform.retry.patterns,
        };

        Ok(ConfigBundle {
            total_has,
            pem_path,
            bootstrap_password,
            ha,
            ha_overrides,
            terraform,
            tf_vars: self.tf_vars,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

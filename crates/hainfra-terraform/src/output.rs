//! Decoded Terraform outputs

use crate::error::{Result, TerraformError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat string map produced by the module's aggregate output
/// (`ha_<n>_<field>` keys by convention).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSet(BTreeMap<String, String>);

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Decode Terraform JSON output.
    ///
    /// Accepts either the value of the named output (`terraform output -json <name>`)
    /// or the full `terraform output -json` document, in which case the map is taken
    /// from `<name>.value`.
    pub fn parse(output_name: &str, raw: &str) -> Result<Self> {
        let parse_error = |source| TerraformError::OutputParse {
            output: output_name.to_string(),
            raw: raw.to_string(),
            source,
        };

        let value: Value = serde_json::from_str(raw.trim()).map_err(parse_error)?;
        let value = match value {
            Value::Object(mut document) => match document.remove(output_name) {
                Some(Value::Object(mut entry)) if entry.contains_key("type") => {
                    entry.remove("value").unwrap_or(Value::Null)
                }
                Some(entry) => entry,
                None => Value::Object(document),
            },
            other => other,
        };

        serde_json::from_value(value)
            .map(OutputSet)
            .map_err(parse_error)
    }
}

impl From<BTreeMap<String, String>> for OutputSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OutputSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

//! Provisioning request and `terraform.tfvars` rendering

use crate::error::{Result, TerraformError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Variable that carries the number of HA instances into the Terraform module
pub const TOTAL_HAS_VAR: &str = "total_has";

/// Everything Terraform needs for one apply/destroy cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    /// Number of HA instances the module should create
    pub count: u32,

    /// Module input variables, passed through untouched
    pub variables: BTreeMap<String, Value>,
}

impl ProvisioningRequest {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_variables<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in vars {
            self.variables.insert(name.into(), value.into());
        }
        self
    }

    /// Variables as Terraform sees them, `total_has` included
    pub fn effective_variables(&self) -> BTreeMap<String, Value> {
        let mut vars = self.variables.clone();
        vars.insert(TOTAL_HAS_VAR.to_string(), Value::from(self.count));
        vars
    }

    /// Render the request as a `terraform.tfvars` document
    pub fn to_tfvars(&self) -> Result<String> {
        let mut out = String::new();
        for (name, value) in self.effective_variables() {
            if !is_identifier(&name) {
                return Err(TerraformError::InvalidVariable(name));
            }
            out.push_str(&name);
            out.push_str(" = ");
            render_value(&value, &mut out);
            out.push('\n');
        }
        Ok(out)
    }
}

/// HCL identifier: letter or underscore first, then letters, digits, `_` or `-`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn render_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => render_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_string(key, out);
                out.push_str(" = ");
                render_value(item, out);
            }
            out.push('}');
        }
    }
}

fn render_string(s: &str, out: &mut String) {
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // template sequences would otherwise be interpolated
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

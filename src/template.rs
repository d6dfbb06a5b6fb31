//! Template interpolation for profiles and routes
//!
//! Handles `{{ path }}` interpolation. Four roots are understood:
//!
//! - `env.NAME` reads the process environment
//! - `vars.*` holds values passed on the command line
//! - `record.*` is the parent record while assembling attachments
//! - `attachment.*` is the attachment being downloaded

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_@$][a-zA-Z0-9_@$]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Values available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Command-line variables
    pub vars: Value,
    /// Current parent record
    pub record: Value,
    /// Current attachment
    pub attachment: Value,
    /// Whether `env.*` may read the process environment
    pub allow_env: bool,
}

impl TemplateContext {
    /// Empty context with environment access
    pub fn new() -> Self {
        Self {
            allow_env: true,
            ..Default::default()
        }
    }

    /// Context with command-line variables
    pub fn with_vars(vars: Value) -> Self {
        Self {
            vars,
            ..Self::new()
        }
    }

    /// Context for a record (and optionally one of its attachments)
    pub fn for_record(record: &Value) -> Self {
        Self {
            record: record.clone(),
            ..Default::default()
        }
    }

    /// Set the current attachment
    #[must_use]
    pub fn with_attachment(mut self, attachment: &Value) -> Self {
        self.attachment = attachment.clone();
        self
    }

    /// Look up a value by path (e.g. `record.id`)
    pub fn get(&self, path: &str) -> Option<Value> {
        let parts: Vec<&str> = path.split('.').collect();

        let root = match parts[0] {
            "env" => {
                if !self.allow_env || parts.len() != 2 {
                    return None;
                }
                return std::env::var(parts[1]).ok().map(Value::String);
            }
            "vars" => &self.vars,
            "record" => &self.record,
            "attachment" => &self.attachment,
            // Bare names fall back to vars
            _ => return get_nested_value(&self.vars, &parts).cloned(),
        };

        get_nested_value(root, &parts[1..]).cloned()
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => current = map.get(*part)?,
            _ => return None,
        }
    }
    match current {
        Value::Null => None,
        found => Some(found),
    }
}

/// Render a template string with the given context.
///
/// Every unresolved variable is reported in one `UndefinedVariable` error.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let path = &caps[1];
        match ctx.get(path) {
            Some(value) => value_to_string(&value),
            None => {
                missing.push(path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Render every string in a JSON value, keys included
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::new();
            for (k, v) in map {
                let key = if has_templates(k) { render(k, ctx)? } else { k.clone() };
                rendered.insert(key, render_value(v, ctx)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

//! `${VAR}` substitution for config values.
//!
//! Names must match `[A-Z_][A-Z0-9_]*`. Writing `$${VAR}` keeps the literal
//! text `${VAR}`.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, thiserror::Error)]
#[error("config value at {config_path} references ${{{var_name}}}, which is not set")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute references from `env`. An unset or empty variable is an error
/// naming the first offending config path.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(rewrite(value, "", &mut |s, path| expand(s, env, path))?)
}

/// Names of every `${VAR}` a config tree would read, sorted and unique.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut names = Vec::new();
    let _ = rewrite(value, "", &mut |s, _| {
        names.extend(
            REFERENCE_PATTERN
                .captures_iter(s)
                .filter(|caps| caps[1].is_empty())
                .map(|caps| caps[2].to_string()),
        );
        Ok::<_, MissingEnvVarError>(s.to_string())
    });
    names.sort();
    names.dedup();
    names
}

/// Rebuild `value`, passing every string leaf and its dotted path to `leaf`.
fn rewrite<E>(
    value: &Value,
    path: &str,
    leaf: &mut impl FnMut(&str, &str) -> Result<String, E>,
) -> Result<Value, E> {
    Ok(match value {
        Value::String(s) => Value::String(leaf(s, path)?),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(rewrite(item, &format!("{path}[{i}]"), leaf)?);
            }
            Value::Array(out)
        }
        Value::Object(fields) => {
            let mut out = Map::new();
            for (key, child) in fields {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                out.insert(key.clone(), rewrite(child, &child_path, leaf)?);
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    })
}

fn expand(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut first_missing = None;
    let expanded = REFERENCE_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name).filter(|v| !v.is_empty()) {
            Some(v) => v.clone(),
            None => {
                first_missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match first_missing {
        Some(var_name) => Err(MissingEnvVarError {
            var_name,
            config_path: path.to_string(),
        }),
        None => Ok(expanded.into_owned()),
    }
}

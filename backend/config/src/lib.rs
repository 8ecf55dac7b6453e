//! `mathmentor-config`: MathMentor runtime configuration.
//!
//! Provides:
//! - Typed config schema (provider, OCR, gateway, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Default value application and validation
//! - Config redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{GatewayConfig, LoggingConfig, MathMentorConfig, OcrConfig, ProviderConfig, RetryConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Turn a freshly loaded config into the one the runtime uses.
///
/// Substitutes `${VAR}` references, fills defaults, then validates.
/// Warnings are logged; any validation error fails.
pub fn prepare(raw_config: MathMentorConfig) -> Result<MathMentorConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: MathMentorConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("configuration has {} error(s): {}", report.errors.len(), report.errors[0]);
    }

    Ok(config)
}

//! CLI Doctor Command
//!
//! Checks the local setup: config validity, the OCR binary, and whether an
//! API key is available.

use std::path::Path;

use anyhow::{bail, Result};

use mathmentor_config::{apply_all_defaults, collect_referenced_vars, prepare, validate, MathMentorConfig};

use crate::config::{initial_api_key, tesseract, API_KEY_ENV};
use crate::terminal_output::{note_error, note_success, render_checks, supports_color, CheckRow, Tone};

/// Executes the full doctor diagnosis against the config as loaded from disk.
///
/// `load_error` is set when the file could not be read or parsed; the
/// remaining checks then run against defaults. Fails when any check does.
pub async fn run(
    raw: MathMentorConfig,
    load_error: Option<String>,
    config_path: &Path,
    api_key_flag: Option<String>,
) -> Result<()> {
    println!("\nRunning MathMentor doctor...\n");

    let rows = collect_rows(raw, load_error, config_path, api_key_flag).await;
    print!("{}", render_checks(&rows, supports_color()));
    println!();

    let failed = rows.iter().filter(|r| r.tone == Tone::Error).count();
    if failed > 0 {
        note_error("Some checks failed. Fix the errors above.");
        bail!("{failed} doctor check(s) failed");
    }
    note_success("All required checks passed.");
    Ok(())
}

async fn collect_rows(
    raw: MathMentorConfig,
    load_error: Option<String>,
    config_path: &Path,
    api_key_flag: Option<String>,
) -> Vec<CheckRow> {
    let mut rows = Vec::new();
    if let Some(e) = load_error {
        rows.push(CheckRow::new("config file", Tone::Error, e));
    }
    rows.extend(check_env_refs(&raw));
    let config = match prepare(raw.clone()) {
        Ok(config) => config,
        Err(e) => {
            rows.push(CheckRow::new("config", Tone::Error, format!("{e:#}")));
            // Plain defaults so the remaining checks still run.
            apply_all_defaults(raw)
        }
    };

    rows.extend(check_config(&config, config_path));
    rows.push(check_tesseract(&config).await);
    rows.push(check_api_key(initial_api_key(api_key_flag, &config).as_deref()));
    rows
}

fn check_env_refs(raw: &MathMentorConfig) -> Vec<CheckRow> {
    let Ok(value) = serde_json::to_value(raw) else {
        return Vec::new();
    };
    collect_referenced_vars(&value)
        .into_iter()
        .map(|name| match std::env::var(&name) {
            Ok(v) if !v.is_empty() => CheckRow::new(format!("${name}"), Tone::Success, "set"),
            _ => CheckRow::new(format!("${name}"), Tone::Error, "referenced in config but not set"),
        })
        .collect()
}

fn check_config(config: &MathMentorConfig, path: &Path) -> Vec<CheckRow> {
    let mut rows = Vec::new();
    if path.exists() {
        rows.push(CheckRow::new("config file", Tone::Success, path.display().to_string()));
    } else {
        rows.push(CheckRow::new(
            "config file",
            Tone::Info,
            format!("{} not found, using defaults", path.display()),
        ));
    }

    let report = validate(config);
    for error in &report.errors {
        rows.push(CheckRow::new(error.path.clone(), Tone::Error, error.message.clone()));
    }
    for warning in &report.warnings {
        rows.push(CheckRow::new(warning.path.clone(), Tone::Warn, warning.message.clone()));
    }
    rows.push(CheckRow::new(
        "provider",
        Tone::Info,
        format!("{} ({})", config.provider.base_url(), config.provider.model()),
    ));
    rows
}

async fn check_tesseract(config: &MathMentorConfig) -> CheckRow {
    let engine = tesseract(config);
    match engine.version().await {
        Ok(version) => CheckRow::new("tesseract", Tone::Success, version),
        Err(e) => CheckRow::new("tesseract", Tone::Error, format!("{e:#}")),
    }
}

fn check_api_key(api_key: Option<&str>) -> CheckRow {
    match api_key {
        Some(_) => CheckRow::new("api key", Tone::Success, "available"),
        None => CheckRow::new(
            "api key",
            Tone::Warn,
            format!("not set; pass --api-key, set {API_KEY_ENV}, or enter it in the TUI"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_warning_only() {
        assert_eq!(check_api_key(None).tone, Tone::Warn);
        assert_eq!(check_api_key(Some("gsk_x")).tone, Tone::Success);
    }

    #[test]
    fn test_invalid_config_reported() {
        let mut config = MathMentorConfig::default();
        config.provider.timeout_secs = Some(0);
        let rows = check_config(&config, Path::new("/nonexistent/config.yaml"));
        assert_eq!(rows[0].tone, Tone::Info);
        assert!(rows.iter().any(|r| r.tone == Tone::Error && r.name.contains("timeoutSecs")));
    }

    #[test]
    fn test_unset_env_reference_is_error() {
        let mut config = MathMentorConfig::default();
        config.provider.api_key = Some("${MATHMENTOR_DOCTOR_TEST_UNSET_KEY}".into());
        let rows = check_env_refs(&config);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "$MATHMENTOR_DOCTOR_TEST_UNSET_KEY");
        assert_eq!(rows[0].tone, Tone::Error);
    }

    #[tokio::test]
    async fn test_unparseable_file_is_reported_and_fails() {
        let mut raw = MathMentorConfig::default();
        raw.ocr.tesseract_cmd = Some("/nonexistent/tesseract-bin".into());
        let load_error = Some("Failed to parse config YAML at: /tmp/config.yaml".to_string());

        let rows = collect_rows(raw.clone(), load_error.clone(), Path::new("/tmp/config.yaml"), None).await;
        assert_eq!(rows[0].name, "config file");
        assert_eq!(rows[0].tone, Tone::Error);
        assert!(rows.iter().any(|r| r.name == "tesseract"));

        let result = run(raw, load_error, Path::new("/tmp/config.yaml"), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_tesseract_is_error() {
        let mut config = MathMentorConfig::default();
        config.ocr.tesseract_cmd = Some("/nonexistent/tesseract-bin".into());
        let row = check_tesseract(&config).await;
        assert_eq!(row.tone, Tone::Error);
    }
}

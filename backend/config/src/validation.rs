//! Config validation with user-friendly error messages.

use crate::schema::MathMentorConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &MathMentorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_provider(config, &mut report);
    validate_ocr(config, &mut report);
    validate_gateway(config, &mut report);
    report
}

fn validate_provider(config: &MathMentorConfig, report: &mut ValidationReport) {
    let provider = &config.provider;

    if let Some(url) = &provider.base_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            report.error("provider.baseUrl", "baseUrl must start with http:// or https://");
        } else if url.starts_with("http://") && !is_loopback_url(url) {
            report.warn(
                "provider.baseUrl",
                "baseUrl is not TLS; the API key would be sent in clear text",
            );
        }
    }
    if provider.model.as_deref().map(str::trim) == Some("") {
        report.error("provider.model", "model cannot be empty");
    }
    if provider.timeout_secs == Some(0) {
        report.error("provider.timeoutSecs", "timeoutSecs must be > 0");
    }

    let Some(retry) = &provider.retry else { return };
    if retry.max_attempts == Some(0) {
        report.error("provider.retry.maxAttempts", "maxAttempts must be >= 1");
    }
    if let Some(factor) = retry.backoff_factor {
        if factor < 1.0 {
            report.error("provider.retry.backoffFactor", "backoffFactor must be >= 1.0");
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if base > max {
            report.warn(
                "provider.retry.baseDelayMs",
                format!("baseDelayMs ({base}) exceeds maxDelayMs ({max}); every wait will be capped"),
            );
        }
    }
}

fn is_loopback_url(url: &str) -> bool {
    let host = url
        .trim_start_matches("http://")
        .split(['/', ':'])
        .next()
        .unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1")
}

fn validate_ocr(config: &MathMentorConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    if ocr.tesseract_cmd.as_deref().map(str::trim) == Some("") {
        report.error("ocr.tesseractCmd", "tesseractCmd cannot be empty");
    }
    if let Some(psm) = ocr.psm {
        if psm > 13 {
            report.error("ocr.psm", format!("psm must be between 0 and 13, got {psm}"));
        }
    }
    if ocr.languages.as_deref().map(str::trim) == Some("") {
        report.error("ocr.languages", "languages cannot be empty");
    }
}

fn validate_gateway(config: &MathMentorConfig, report: &mut ValidationReport) {
    if let Some(port) = config.gateway.port {
        if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "gateway.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
    if config.gateway.session_ttl_secs == Some(0) {
        report.error("gateway.sessionTtlSecs", "sessionTtlSecs must be > 0");
    }
}

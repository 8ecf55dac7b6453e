//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{MathMentorConfig, RetryConfig};

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Default per-request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// One attempt per call unless configured otherwise.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_BACKOFF_FACTOR: f64 = 2.0;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;

pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Tesseract page segmentation mode 6: a single uniform block of text.
pub const DEFAULT_PSM: u8 = 6;

pub const DEFAULT_OCR_LANGUAGES: &str = "eng";

pub const DEFAULT_GATEWAY_BIND: &str = "127.0.0.1";
pub const DEFAULT_GATEWAY_PORT: u16 = 8080;

/// Idle gateway sessions are dropped after an hour.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3_600;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: MathMentorConfig) -> MathMentorConfig {
    let config = apply_provider_defaults(config);
    let config = apply_ocr_defaults(config);
    let config = apply_gateway_defaults(config);
    apply_logging_defaults(config)
}

fn apply_provider_defaults(mut config: MathMentorConfig) -> MathMentorConfig {
    let provider = &mut config.provider;
    provider.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    provider.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    provider.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);

    let retry = provider.retry.get_or_insert_with(RetryConfig::default);
    retry.max_attempts.get_or_insert(DEFAULT_RETRY_MAX_ATTEMPTS);
    retry.base_delay_ms.get_or_insert(DEFAULT_RETRY_BASE_DELAY_MS);
    retry.backoff_factor.get_or_insert(DEFAULT_RETRY_BACKOFF_FACTOR);
    retry.max_delay_ms.get_or_insert(DEFAULT_RETRY_MAX_DELAY_MS);
    config
}

fn apply_ocr_defaults(mut config: MathMentorConfig) -> MathMentorConfig {
    let ocr = &mut config.ocr;
    ocr.tesseract_cmd.get_or_insert_with(|| DEFAULT_TESSERACT_CMD.to_string());
    ocr.psm.get_or_insert(DEFAULT_PSM);
    ocr.languages.get_or_insert_with(|| DEFAULT_OCR_LANGUAGES.to_string());
    config
}

fn apply_gateway_defaults(mut config: MathMentorConfig) -> MathMentorConfig {
    config.gateway.bind.get_or_insert_with(|| DEFAULT_GATEWAY_BIND.to_string());
    config.gateway.port.get_or_insert(DEFAULT_GATEWAY_PORT);
    config.gateway.session_ttl_secs.get_or_insert(DEFAULT_SESSION_TTL_SECS);
    config
}

fn apply_logging_defaults(mut config: MathMentorConfig) -> MathMentorConfig {
    config.logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config.logging.json.get_or_insert(false);
    config
}

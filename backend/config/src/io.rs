//! Config file read/write with atomic backup rotation.

use crate::schema::MathMentorConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 3;

/// Resolve the MathMentor config directory.
/// Priority: `MATHMENTOR_CONFIG_DIR` env > `~/.mathmentor/` > `./.mathmentor`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MATHMENTOR_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".mathmentor"),
        None => PathBuf::from(".mathmentor"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<MathMentorConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(MathMentorConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null
    if raw.trim().is_empty() {
        return Ok(MathMentorConfig::default());
    }

    let config: MathMentorConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Replace the config file with `config` as YAML.
///
/// The new content goes to a sibling temp file that is then renamed over the
/// target. Up to [`MAX_BACKUPS`] earlier versions are kept as
/// `config.yaml.bak.1` (newest) to `.bak.N`.
pub async fn write_config(config: &MathMentorConfig, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?,
        _ => {}
    }
    if path.exists() {
        keep_backup(path).await;
    }

    let staging = path.with_extension("yaml.tmp");
    fs::write(&staging, yaml)
        .await
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, path)
        .await
        .with_context(|| format!("Failed to move {} into place", staging.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

fn backup_path(path: &Path, n: usize) -> PathBuf {
    path.with_extension(format!("yaml.bak.{n}"))
}

/// Shift existing backups up by one, dropping the oldest, then copy the
/// current file to `.bak.1`. Failures are logged and never block the write.
async fn keep_backup(path: &Path) {
    for n in (1..MAX_BACKUPS).rev() {
        let from = backup_path(path, n);
        if !from.exists() {
            continue;
        }
        if let Err(e) = fs::rename(&from, backup_path(path, n + 1)).await {
            warn!(backup = %from.display(), error = %e, "Could not rotate config backup");
        }
    }
    let newest = backup_path(path, 1);
    if let Err(e) = fs::copy(path, &newest).await {
        warn!(backup = %newest.display(), error = %e, "Could not back up config");
    }
}

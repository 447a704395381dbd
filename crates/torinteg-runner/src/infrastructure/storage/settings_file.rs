//! Settings file loading and layering.
//!
//! The effective settings of a run are built from three layers, later layers
//! winning:
//!
//! 1. the defaults bundled with `torinteg-core`,
//! 2. the settings file (default `test/settings.cfg`), when it exists,
//! 3. `--set key=value` overrides from the command line.
//!
//! A missing settings file is not an error: the runner works from the
//! bundled defaults alone. An unreadable or malformed file is.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use torinteg_core::domain::runner::default_document;
use torinteg_core::{load_file, SettingKey, SettingValue, SettingsDocument, SettingsError};

/// Settings file used when none is given on the command line.
pub const DEFAULT_SETTINGS_PATH: &str = "test/settings.cfg";

/// Error type for loading and layering settings.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The settings file could not be read or parsed.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A `--set` argument is not of the form `key=value`.
    #[error("invalid override {raw:?}: {reason}")]
    InvalidOverride { raw: String, reason: String },
}

/// The settings of one run, with the settings file kept separately so it can
/// be checked on its own.
#[derive(Debug, Clone)]
pub struct LayeredSettings {
    /// Where the settings file was looked for.
    pub path: PathBuf,
    /// The settings file as written, or `None` if it does not exist.
    pub file: Option<SettingsDocument>,
    /// Defaults, file, and overrides merged.
    pub effective: SettingsDocument,
}

/// Parses a `key=value` override. An empty value (`key=`) is allowed and
/// disables the setting.
///
/// # Errors
///
/// Returns [`StorageError::InvalidOverride`] if `=` is missing or the key is
/// not a valid dotted key.
pub fn parse_override(raw: &str) -> Result<(SettingKey, SettingValue), StorageError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| StorageError::InvalidOverride {
            raw: raw.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })?;

    let key = SettingKey::new(key.trim()).map_err(|e| StorageError::InvalidOverride {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    Ok((key, SettingValue::classify(value.trim())))
}

/// Reads the settings file at `path`, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Settings`] for I/O errors other than "not found"
/// and for malformed content.
pub fn read_settings_file(path: &Path) -> Result<Option<SettingsDocument>, StorageError> {
    match load_file(path) {
        Ok(doc) => Ok(Some(doc)),
        Err(SettingsError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            debug!("no settings file at {}, using bundled defaults", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Builds the effective settings for a run.
///
/// # Errors
///
/// Returns [`StorageError`] if the file cannot be read or parsed, or an
/// override is malformed.
pub fn load_layered(path: &Path, overrides: &[String]) -> Result<LayeredSettings, StorageError> {
    let mut effective = default_document()?;

    let file = read_settings_file(path)?;
    if let Some(doc) = &file {
        effective.merge(doc.clone());
        debug!("merged {} settings from {}", doc.len(), path.display());
    }

    for raw in overrides {
        let (key, value) = parse_override(raw)?;
        debug!("override {key} = {value:?}");
        effective.set(key, value);
    }

    Ok(LayeredSettings {
        path: path.to_path_buf(),
        file,
        effective,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Error type shared by the settings reader and the typed settings view.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or interpreting a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the settings file could not be parsed.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A key is not a dotted sequence of identifier segments.
    #[error("invalid setting key: {key:?}")]
    InvalidKey { key: String },

    /// A key holds a value of the wrong type.
    #[error("setting {key} expects {expected}, found {found:?}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },

    /// Process-wide settings were already installed for this run.
    #[error("runner settings are already installed for this process")]
    AlreadyInstalled,
}

impl SettingsError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(key: &str, expected: &'static str, found: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_includes_line_number() {
        let err = SettingsError::parse(7, "continuation without a key");
        assert_eq!(err.to_string(), "line 7: continuation without a key");
    }

    #[test]
    fn test_invalid_value_message_names_key_and_expectation() {
        let err = SettingsError::invalid_value("argument.unit", "a boolean", "yes");
        assert_eq!(
            err.to_string(),
            "setting argument.unit expects a boolean, found \"yes\""
        );
    }
}

//! Setting values and parsed entries.

use std::fmt;

use serde::Serialize;

use super::key::SettingKey;

/// The value half of a setting.
///
/// `true` and `false` (exact, lower case) are booleans, a missing value is
/// [`SettingValue::Empty`], and anything else is passed through as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// No value: the setting is disabled or falls back to the consumer's default.
    Empty,
    Bool(bool),
    /// Free text, including paths and runlevels.
    Text(String),
}

impl SettingValue {
    /// Classifies a raw, already trimmed value token.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "" => Self::Empty,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Text(other.to_string()),
        }
    }

    /// Whether the setting was given without a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The boolean, or `None` for any non-boolean value (empty included).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as it would be written in a settings file.
    pub fn raw(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Text(s) => s,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// One `key value` entry together with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub key: SettingKey,
    pub value: SettingValue,
    /// 1-based source line, or 0 for settings created programmatically.
    pub line: usize,
}

impl Setting {
    pub fn new(key: SettingKey, value: SettingValue, line: usize) -> Self {
        Self { key, value, line }
    }
}

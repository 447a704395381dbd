//! Ordered collection of parsed settings with typed lookups.
//!
//! Entries are kept in source order, duplicates included, so that the lint
//! pass can report them. Lookups always return the *last* occurrence of a
//! key: later lines, and layers merged on top, override earlier ones.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::key::SettingKey;
use super::value::{Setting, SettingValue};
use crate::error::SettingsError;

/// Settings in source order, as parsed or layered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDocument {
    entries: Vec<Setting>,
}

impl SettingsDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parsed entry, keeping any earlier entry with the same key.
    pub fn push(&mut self, setting: Setting) {
        self.entries.push(setting);
    }

    /// Sets `key` to `value`, replacing every earlier occurrence.
    ///
    /// Used for command-line overrides, which must never look like duplicates.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) {
        self.entries.retain(|s| s.key != key);
        self.entries.push(Setting::new(key, value, 0));
    }

    /// Layers `other` on top of `self`: every key `other` defines replaces
    /// the value held here.
    pub fn merge(&mut self, other: SettingsDocument) {
        for setting in other.entries {
            self.entries.retain(|s| s.key != setting.key);
            self.entries.push(setting);
        }
    }

    /// Number of entries, counting duplicates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in source order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.entries.iter()
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<&SettingKey> {
        let mut seen = Vec::new();
        for setting in &self.entries {
            if !seen.contains(&&setting.key) {
                seen.push(&setting.key);
            }
        }
        seen
    }

    /// Whether `key` appears at all, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|s| s.key.as_str() == key)
    }

    /// The effective entry for `key`: its last occurrence.
    pub fn get_setting(&self, key: &str) -> Option<&Setting> {
        self.entries.iter().rev().find(|s| s.key.as_str() == key)
    }

    /// The effective value of `key`.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.get_setting(key).map(|s| &s.value)
    }

    /// Every value recorded for `key`, in source order.
    pub fn get_all(&self, key: &str) -> Vec<&SettingValue> {
        self.entries
            .iter()
            .filter(|s| s.key.as_str() == key)
            .map(|s| &s.value)
            .collect()
    }

    /// The raw text of `key`; `Some("")` for an empty value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(SettingValue::raw)
    }

    /// The effective value of `key` as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] if the key is present but is
    /// not `true` or `false`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        match self.get(key) {
            None => Ok(None),
            Some(SettingValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(SettingsError::invalid_value(key, "a boolean", other.raw())),
        }
    }

    /// The effective value of `key` as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] if the key is present but does
    /// not hold a decimal integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, SettingsError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .raw()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| SettingsError::invalid_value(key, "an integer", value.raw())),
        }
    }

    /// An empty value yields `None`, the same as a missing key.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    }

    /// Effective values keyed by setting name, sorted by key.
    pub fn effective(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|s| (s.key.to_string(), s.value.raw().to_string()))
            .collect()
    }
}

impl FromIterator<Setting> for SettingsDocument {
    fn from_iter<T: IntoIterator<Item = Setting>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

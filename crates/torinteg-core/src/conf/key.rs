//! Dotted setting keys such as `integ.target.run.cookie`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::SettingsError;

/// A validated, dot-separated setting key.
///
/// Every segment is non-empty and made of ASCII letters, digits, or `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettingKey(String);

impl SettingKey {
    /// Validates `raw` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidKey`] if any segment is empty or holds a
    /// character outside `[A-Za-z0-9_]`.
    pub fn new(raw: &str) -> Result<Self, SettingsError> {
        let valid = !raw.is_empty()
            && raw.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
            });

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(SettingsError::InvalidKey {
                key: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the dot-separated segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Everything before the last segment, e.g. `integ.target.run` for
    /// `integ.target.run.open`. Empty for single-segment keys.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// The last segment, e.g. `open` for `integ.target.run.open`.
    pub fn leaf(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, leaf)| leaf)
    }

    /// Returns `true` if this key lives under `namespace` (at any depth).
    pub fn is_under(&self, namespace: &str) -> bool {
        self.0
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SettingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SettingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_exposes_namespace_and_leaf() {
        // Arrange / Act
        let key = SettingKey::new("integ.target.run.cookie").unwrap();

        // Assert
        assert_eq!(key.namespace(), "integ.target.run");
        assert_eq!(key.leaf(), "cookie");
        assert_eq!(
            key.segments().collect::<Vec<_>>(),
            vec!["integ", "target", "run", "cookie"]
        );
    }

    #[test]
    fn test_single_segment_key_has_empty_namespace() {
        let key = SettingKey::new("verbose").unwrap();
        assert_eq!(key.namespace(), "");
        assert_eq!(key.leaf(), "verbose");
    }

    #[test]
    fn test_underscores_and_digits_are_allowed() {
        assert!(SettingKey::new("argument.no_color").is_ok());
        assert!(SettingKey::new("integ.target.run2").is_ok());
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        for raw in ["", ".", "argument.", ".argument", "integ..log"] {
            assert!(
                matches!(SettingKey::new(raw), Err(SettingsError::InvalidKey { .. })),
                "{raw:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_punctuation_in_segment_is_rejected() {
        assert!(SettingKey::new("integ.target-run").is_err());
        assert!(SettingKey::new("integ.log=path").is_err());
    }

    #[test]
    fn test_is_under_requires_segment_boundary() {
        let key = SettingKey::new("integ.target.run.open").unwrap();
        assert!(key.is_under("integ"));
        assert!(key.is_under("integ.target.run"));
        assert!(!key.is_under("integ.target.ru"));
        assert!(!key.is_under("integ.target.run.open"));
    }
}

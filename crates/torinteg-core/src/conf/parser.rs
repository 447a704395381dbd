//! Line-oriented reader for the settings file format.
//!
//! Format:
//! ```text
//! # comment
//! <dotted.key> <value>
//! <dotted.key>            (no value: empty / disabled)
//! <dotted.key>
//! |first line of a multi-line value
//! |second line
//! ```
//! Key and value are separated by the first run of whitespace. The value is
//! trimmed and classified by [`SettingValue::classify`]. Only whole lines are
//! comments: a `#` inside a value is kept. A blank or comment line ends a
//! multi-line value, so any `|` line after it is an error. A leading UTF-8
//! byte order mark is ignored.

use std::path::Path;

use tracing::debug;

use super::document::SettingsDocument;
use super::key::SettingKey;
use super::value::{Setting, SettingValue};
use crate::error::SettingsError;

const COMMENT_PREFIX: char = '#';
const CONTINUATION_PREFIX: char = '|';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// A valueless key waiting to see whether continuation lines follow.
struct Pending {
    key: SettingKey,
    line: usize,
    lines: Vec<String>,
}

impl Pending {
    fn finish(self) -> Setting {
        let value = SettingValue::classify(&self.lines.join("\n"));
        Setting::new(self.key, value, self.line)
    }
}

/// Parses settings text into a [`SettingsDocument`].
///
/// # Errors
///
/// Returns [`SettingsError::Parse`] for an invalid key or a continuation line
/// that does not follow a valueless key.
///
/// # Examples
///
/// ```rust
/// use torinteg_core::conf::{parse_str, SettingValue};
///
/// let doc = parse_str("integ.target.run.open true\nargument.log\n").unwrap();
/// assert_eq!(doc.get("integ.target.run.open"), Some(&SettingValue::Bool(true)));
/// assert_eq!(doc.get("argument.log"), Some(&SettingValue::Empty));
/// ```
pub fn parse_str(text: &str) -> Result<SettingsDocument, SettingsError> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut doc = SettingsDocument::new();
    let mut pending: Option<Pending> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if let Some(rest) = line.strip_prefix(CONTINUATION_PREFIX) {
            match pending.as_mut() {
                Some(p) => p.lines.push(rest.to_string()),
                None => {
                    return Err(SettingsError::parse(
                        line_no,
                        "continuation line without a preceding valueless key",
                    ))
                }
            }
            continue;
        }

        if let Some(p) = pending.take() {
            doc.push(p.finish());
        }

        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let (raw_key, raw_value) = match line.split_once(char::is_whitespace) {
            Some((key, value)) => (key, value.trim()),
            None => (line, ""),
        };

        let key = SettingKey::new(raw_key)
            .map_err(|_| SettingsError::parse(line_no, format!("invalid key {raw_key:?}")))?;

        if raw_value.is_empty() {
            pending = Some(Pending {
                key,
                line: line_no,
                lines: Vec::new(),
            });
        } else {
            doc.push(Setting::new(key, SettingValue::classify(raw_value), line_no));
        }
    }

    if let Some(p) = pending {
        doc.push(p.finish());
    }

    Ok(doc)
}

/// Reads and parses the settings file at `path`.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] if the file cannot be read and
/// [`SettingsError::Parse`] if its content is malformed.
pub fn load_file(path: &Path) -> Result<SettingsDocument, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_str(&text)?;
    debug!("loaded {} settings from {}", doc.len(), path.display());
    Ok(doc)
}

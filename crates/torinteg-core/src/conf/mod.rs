//! The settings file format: keys, values, the line reader, and lint checks.

pub mod document;
pub mod key;
pub mod lint;
pub mod parser;
pub mod value;

pub use document::SettingsDocument;
pub use key::SettingKey;
pub use lint::{lint, LintIssue, LintKind, Severity};
pub use parser::{load_file, parse_str};
pub use value::{Setting, SettingValue};

//! Well-formedness checks for a parsed settings file.
//!
//! Parsing is lenient: duplicate keys, unknown keys, and badly typed values
//! all load. [`lint`] reports them so that a settings file can be checked
//! before a run.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::document::SettingsDocument;
use super::value::SettingValue;
use crate::domain::keys;
use crate::domain::runlevel::Runlevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintKind {
    /// The key already appeared on `first_line`.
    DuplicateKey { first_line: usize },
    /// A boolean key holds something other than `true` or `false`.
    ExpectedBoolean { found: String },
    /// `argument.log` is neither empty nor a runlevel.
    InvalidRunlevel { found: String },
    /// A path key is empty.
    EmptyPath,
    /// The key is not one the runner recognizes.
    UnknownKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub key: String,
    pub line: usize,
    #[serde(flatten)]
    pub kind: LintKind,
}

impl LintIssue {
    pub fn severity(&self) -> Severity {
        match self.kind {
            LintKind::UnknownKey => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: ", self.line, self.key)?;
        match &self.kind {
            LintKind::DuplicateKey { first_line } => {
                write!(f, "duplicate key (first defined on line {first_line})")
            }
            LintKind::ExpectedBoolean { found } => {
                write!(f, "expected true or false, found {found:?}")
            }
            LintKind::InvalidRunlevel { found } => write!(f, "unrecognized runlevel {found:?}"),
            LintKind::EmptyPath => f.write_str("path must not be empty"),
            LintKind::UnknownKey => f.write_str("unknown setting"),
        }
    }
}

/// Checks every entry of `doc`, returning issues in source order.
pub fn lint(doc: &SettingsDocument) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for setting in doc.iter() {
        let key = setting.key.as_str();
        let issue = |kind| LintIssue {
            key: key.to_string(),
            line: setting.line,
            kind,
        };

        if let Some(&first_line) = first_seen.get(key) {
            issues.push(issue(LintKind::DuplicateKey { first_line }));
        } else {
            first_seen.insert(key, setting.line);
        }

        if !keys::is_known(key) {
            issues.push(issue(LintKind::UnknownKey));
            continue;
        }

        if keys::is_boolean(key) && setting.value.as_bool().is_none() {
            issues.push(issue(LintKind::ExpectedBoolean {
                found: setting.value.raw().to_string(),
            }));
        }

        if key == keys::ARGUMENT_LOG {
            if let SettingValue::Text(raw) = &setting.value {
                if raw.parse::<Runlevel>().is_err() {
                    issues.push(issue(LintKind::InvalidRunlevel { found: raw.clone() }));
                }
            }
        }

        if keys::PATH_KEYS.contains(&key) && setting.value.is_empty() {
            issues.push(issue(LintKind::EmptyPath));
        }
    }

    issues
}

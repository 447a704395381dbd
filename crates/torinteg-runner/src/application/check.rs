//! Settings file checks.
//!
//! The settings file is linted on its own, so duplicates are reported
//! against the lines the user wrote. The typed conversion runs on the
//! effective, layered settings, which is what a run would actually use.

use std::fmt;

use serde::Serialize;

use torinteg_core::conf::Severity;
use torinteg_core::{lint, LintIssue, RunnerSettings, SettingsDocument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub issues: Vec<LintIssue>,
    /// Why the effective settings could not be read as typed settings.
    pub settings_error: Option<String>,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
            .count()
    }

    /// Whether the check fails. With `strict`, warnings fail it too.
    pub fn is_failure(&self, strict: bool) -> bool {
        self.settings_error.is_some() || self.errors() > 0 || (strict && self.warnings() > 0)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            let label = match issue.severity() {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            writeln!(f, "{label}: {issue}")?;
        }
        if let Some(err) = &self.settings_error {
            writeln!(f, "error: {err}")?;
        }
        write!(f, "{} error(s), {} warning(s)", self.errors(), self.warnings())
    }
}

/// Lints `file` (when there is one) and converts `effective` to typed
/// settings.
pub fn check(file: Option<&SettingsDocument>, effective: &SettingsDocument) -> CheckReport {
    CheckReport {
        issues: file.map(lint).unwrap_or_default(),
        settings_error: RunnerSettings::from_document(effective)
            .err()
            .map(|e| e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

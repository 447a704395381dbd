//! # torinteg-core
//!
//! Settings for tor integration-test runs.
//!
//! A runner reads a plain `key value` settings file once at startup. The file
//! chooses which suites run by default, where tor's data directory and the
//! test log live, and which control-connection scenarios (open port,
//! password, cookie, unix socket, ...) the integration suite exercises.
//!
//! - **`conf`** reads the file format into a [`SettingsDocument`] and checks
//!   it for duplicate, unknown, or badly typed keys.
//! - **`domain`** gives the settings meaning: the typed
//!   [`RunnerSettings`] view and the [`RunTarget`] catalogue.

pub mod conf;
pub mod domain;
pub mod error;

pub use conf::{
    lint, load_file, parse_str, LintIssue, Setting, SettingKey, SettingValue, SettingsDocument,
};
pub use domain::runlevel::Runlevel;
pub use domain::runner::{RunnerSettings, TargetSelection, DEFAULT_SETTINGS};
pub use domain::target::{render_torrc, RunTarget, TargetAttribute};
pub use error::SettingsError;

//! Typed, immutable view of the runner settings.
//!
//! [`RunnerSettings`] is built once from a [`SettingsDocument`] layered over
//! the bundled defaults, then optionally installed as process-wide state with
//! [`install`]. Nothing mutates it afterwards.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::warn;

use super::keys;
use super::runlevel::Runlevel;
use super::target::{RunTarget, TargetAttribute};
use crate::conf::{parse_str, SettingValue, SettingsDocument};
use crate::error::SettingsError;

/// The bundled default settings file.
pub const DEFAULT_SETTINGS: &str = include_str!("../../settings.cfg");

/// Tor command used when `argument.tor` is empty.
pub const DEFAULT_TOR_COMMAND: &str = "tor";

static INSTALLED: OnceLock<RunnerSettings> = OnceLock::new();

/// Defaults for the runner's command-line flags (`argument.*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentDefaults {
    /// Run unit tests when `--unit` is not given.
    pub unit: bool,
    /// Run integration tests when `--integ` is not given.
    pub integ: bool,
    /// `None` when logging is disabled.
    pub log: Option<Runlevel>,
    /// Tor command to test against; never empty.
    pub tor: String,
    /// Disable ANSI colors in output.
    pub no_color: bool,
}

/// File system locations used by integration runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegPaths {
    /// Tor's data directory for integration runs.
    pub test_directory: PathBuf,
    /// Where the integration log is written.
    pub log: PathBuf,
}

/// The `integ.target.*` attribute flags, applied to every run target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetAttributes {
    pub online: bool,
    pub relative_data_dir: bool,
    pub chroot: bool,
}

impl TargetAttributes {
    /// Whether `attribute` is on.
    pub fn is_set(&self, attribute: TargetAttribute) -> bool {
        match attribute {
            TargetAttribute::Online => self.online,
            TargetAttribute::RelativeDataDir => self.relative_data_dir,
            TargetAttribute::Chroot => self.chroot,
        }
    }
}

/// Which `integ.target.run.*` flags are on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSelection {
    flagged: BTreeSet<RunTarget>,
    all: bool,
}

impl TargetSelection {
    pub fn new(flagged: impl IntoIterator<Item = RunTarget>, all: bool) -> Self {
        Self {
            flagged: flagged.into_iter().collect(),
            all,
        }
    }

    /// Whether the target's own flag is `true`, ignoring `all`.
    pub fn is_flagged(&self, target: RunTarget) -> bool {
        self.flagged.contains(&target)
    }

    /// Whether `integ.target.run.all` is on.
    pub fn all(&self) -> bool {
        self.all
    }

    /// Targets to exercise, in catalogue order. `all` overrides the
    /// individual flags.
    pub fn enabled_targets(&self) -> Vec<RunTarget> {
        RunTarget::ALL
            .into_iter()
            .filter(|t| self.all || self.flagged.contains(t))
            .collect()
    }
}

/// Everything the runner reads from its settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerSettings {
    pub arguments: ArgumentDefaults,
    pub paths: IntegPaths,
    pub attributes: TargetAttributes,
    pub targets: TargetSelection,
}

impl RunnerSettings {
    /// Settings from the bundled default file alone.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled file itself is malformed.
    pub fn defaults() -> Result<Self, SettingsError> {
        Self::from_document(&SettingsDocument::new())
    }

    /// Builds the typed view of `doc`, layered over the bundled defaults.
    ///
    /// Unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] when a recognized key holds a
    /// value of the wrong type.
    pub fn from_document(doc: &SettingsDocument) -> Result<Self, SettingsError> {
        for key in doc.keys() {
            if !keys::is_known(key.as_str()) {
                warn!("ignoring unknown setting {key}");
            }
        }

        let mut layered = default_document()?;
        layered.merge(doc.clone());

        let arguments = ArgumentDefaults {
            unit: required_bool(&layered, keys::ARGUMENT_UNIT)?,
            integ: required_bool(&layered, keys::ARGUMENT_INTEG)?,
            log: argument_runlevel(&layered)?,
            tor: layered
                .get_str(keys::ARGUMENT_TOR)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_TOR_COMMAND)
                .to_string(),
            no_color: required_bool(&layered, keys::ARGUMENT_NO_COLOR)?,
        };

        let paths = IntegPaths {
            test_directory: required_path(&layered, keys::INTEG_TEST_DIRECTORY)?,
            log: required_path(&layered, keys::INTEG_LOG)?,
        };

        let attributes = TargetAttributes {
            online: required_bool(&layered, keys::TARGET_ONLINE)?,
            relative_data_dir: required_bool(&layered, keys::TARGET_RELATIVE_DATA_DIR)?,
            chroot: required_bool(&layered, keys::TARGET_CHROOT)?,
        };

        let mut flagged = Vec::new();
        for target in RunTarget::ALL {
            if required_bool(&layered, target.setting_key())? {
                flagged.push(target);
            }
        }
        let targets = TargetSelection::new(flagged, required_bool(&layered, keys::RUN_ALL)?);

        Ok(Self {
            arguments,
            paths,
            attributes,
            targets,
        })
    }
}

/// The bundled defaults as a document.
///
/// # Errors
///
/// Only fails if the bundled file itself is malformed.
pub fn default_document() -> Result<SettingsDocument, SettingsError> {
    parse_str(DEFAULT_SETTINGS)
}

fn required_bool(doc: &SettingsDocument, key: &str) -> Result<bool, SettingsError> {
    doc.get_bool(key)?
        .ok_or_else(|| SettingsError::invalid_value(key, "a boolean", ""))
}

fn required_path(doc: &SettingsDocument, key: &str) -> Result<PathBuf, SettingsError> {
    doc.get_path(key)
        .ok_or_else(|| SettingsError::invalid_value(key, "a path", ""))
}

/// The runlevel `argument.log` names in `doc`; `None` when it is empty or
/// missing.
///
/// Runners use this to configure logging before building the full
/// [`RunnerSettings`], so that warnings raised while building them are seen.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidValue`] if the value is not a runlevel.
pub fn argument_runlevel(doc: &SettingsDocument) -> Result<Option<Runlevel>, SettingsError> {
    match doc.get(keys::ARGUMENT_LOG) {
        None | Some(SettingValue::Empty) => Ok(None),
        Some(value) => value
            .raw()
            .parse::<Runlevel>()
            .map(Some)
            .map_err(|_| {
                SettingsError::invalid_value(keys::ARGUMENT_LOG, "a runlevel", value.raw())
            }),
    }
}

/// Installs `settings` as this process's runner settings.
///
/// # Errors
///
/// Returns [`SettingsError::AlreadyInstalled`] if settings were installed
/// before.
pub fn install(settings: RunnerSettings) -> Result<&'static RunnerSettings, SettingsError> {
    INSTALLED
        .set(settings)
        .map_err(|_| SettingsError::AlreadyInstalled)?;
    INSTALLED.get().ok_or(SettingsError::AlreadyInstalled)
}

/// The installed runner settings, if any.
pub fn current() -> Option<&'static RunnerSettings> {
    INSTALLED.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bundled_file() {
        // Arrange / Act
        let settings = RunnerSettings::defaults().unwrap();

        // Assert
        assert!(!settings.arguments.unit);
        assert!(!settings.arguments.integ);
        assert_eq!(settings.arguments.log, None);
        assert_eq!(settings.arguments.tor, "tor");
        assert!(!settings.arguments.no_color);
        assert_eq!(settings.paths.test_directory, PathBuf::from("./test/data"));
        assert_eq!(settings.paths.log, PathBuf::from("./test/data/log"));
        assert_eq!(settings.attributes, TargetAttributes::default());
    }

    #[test]
    fn test_defaults_enable_only_open_target() {
        let settings = RunnerSettings::defaults().unwrap();
        assert_eq!(settings.targets.enabled_targets(), vec![RunTarget::Open]);
        assert!(!settings.targets.all());
    }

    #[test]
    fn test_all_overrides_individual_flags() {
        // Arrange
        let doc = parse_str("integ.target.run.open false\ninteg.target.run.all true").unwrap();

        // Act
        let settings = RunnerSettings::from_document(&doc).unwrap();

        // Assert
        assert_eq!(settings.targets.enabled_targets(), RunTarget::ALL.to_vec());
        assert!(!settings.targets.is_flagged(RunTarget::Open));
    }

    #[test]
    fn test_individual_flags_select_in_catalogue_order() {
        let doc = parse_str(
            "integ.target.run.ptrace true\ninteg.target.run.cookie true\ninteg.target.run.open false",
        )
        .unwrap();

        let settings = RunnerSettings::from_document(&doc).unwrap();

        assert_eq!(
            settings.targets.enabled_targets(),
            vec![RunTarget::Cookie, RunTarget::Ptrace]
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let doc = parse_str("integ.target.run.telnet true\nargument.verbose true").unwrap();
        let settings = RunnerSettings::from_document(&doc).unwrap();
        assert_eq!(settings, RunnerSettings::defaults().unwrap());
    }

    #[test]
    fn test_runlevel_is_parsed() {
        let doc = parse_str("argument.log debug").unwrap();
        let settings = RunnerSettings::from_document(&doc).unwrap();
        assert_eq!(settings.arguments.log, Some(Runlevel::Debug));
    }

    #[test]
    fn test_invalid_runlevel_is_error() {
        let doc = parse_str("argument.log chatty").unwrap();
        let err = RunnerSettings::from_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue { expected: "a runlevel", .. }
        ));
    }

    #[test]
    fn test_non_boolean_flag_is_error() {
        let doc = parse_str("integ.target.run.socket maybe").unwrap();
        let err = RunnerSettings::from_document(&doc).unwrap_err();
        match err {
            SettingsError::InvalidValue { key, found, .. } => {
                assert_eq!(key, "integ.target.run.socket");
                assert_eq!(found, "maybe");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_tor_command_falls_back_to_default() {
        let doc = parse_str("argument.tor").unwrap();
        let settings = RunnerSettings::from_document(&doc).unwrap();
        assert_eq!(settings.arguments.tor, DEFAULT_TOR_COMMAND);
    }

    #[test]
    fn test_empty_test_directory_is_error() {
        let doc = parse_str("integ.test_directory").unwrap();
        assert!(RunnerSettings::from_document(&doc).is_err());
    }

    #[test]
    fn test_attributes_are_read() {
        let doc = parse_str("integ.target.online true\ninteg.target.chroot true").unwrap();

        let settings = RunnerSettings::from_document(&doc).unwrap();

        assert!(settings.attributes.is_set(TargetAttribute::Online));
        assert!(settings.attributes.is_set(TargetAttribute::Chroot));
        assert!(!settings.attributes.is_set(TargetAttribute::RelativeDataDir));
    }

    #[test]
    fn test_install_is_once_per_process() {
        // Arrange
        let settings = RunnerSettings::defaults().unwrap();

        // Act
        let first = install(settings.clone());
        let second = install(settings.clone());

        // Assert: whichever call won, exactly one value is visible and it
        // cannot be replaced.
        assert!(first.is_ok() || matches!(first, Err(SettingsError::AlreadyInstalled)));
        assert!(matches!(second, Err(SettingsError::AlreadyInstalled)));
        assert_eq!(current(), Some(&settings));
    }
}

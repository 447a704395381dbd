//! Run-plan resolution.
//!
//! Combines the typed settings with the flags given on the command line into
//! a [`RunPlan`]: which suites run, with which tor binary, where data and logs
//! go, and the torrc of every selected target.
//!
//! Command-line flags follow the `argument.*` defaults: a flag that is given
//! wins, a flag that is absent leaves the default in place. The boolean flags
//! (`--unit`, `--integ`, `--no-color`) can only switch their setting on.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use torinteg_core::{render_torrc, RunTarget, Runlevel, RunnerSettings, TargetAttribute};

/// Flags given on the command line for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub unit: bool,
    pub integ: bool,
    pub log: Option<Runlevel>,
    pub tor: Option<String>,
    pub no_color: bool,
}

/// One target the integration suite will exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetPlan {
    pub target: RunTarget,
    pub description: &'static str,
    pub torrc: String,
}

/// The fully resolved plan of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    pub run_unit: bool,
    pub run_integ: bool,
    /// `None` when logging is disabled.
    pub log: Option<Runlevel>,
    pub tor_command: String,
    pub no_color: bool,
    /// Tor's data directory, relative when `relative_data_dir` is set.
    pub data_directory: PathBuf,
    pub log_file: PathBuf,
    pub attributes: Vec<TargetAttribute>,
    pub targets: Vec<TargetPlan>,
}

impl RunPlan {
    /// Resolves `settings` and `overrides` into a plan. Relative paths
    /// resolve against `base_dir`.
    pub fn resolve(settings: &RunnerSettings, overrides: &RunOverrides, base_dir: &Path) -> Self {
        let args = &settings.arguments;

        let data_directory = if settings.attributes.relative_data_dir {
            normalize(&settings.paths.test_directory)
        } else {
            absolutize(base_dir, &settings.paths.test_directory)
        };

        let targets = settings
            .targets
            .enabled_targets()
            .into_iter()
            .map(|target| TargetPlan {
                target,
                description: target.description(),
                torrc: render_torrc(target, &data_directory),
            })
            .collect();

        let attributes = TargetAttribute::ALL
            .into_iter()
            .filter(|a| settings.attributes.is_set(*a))
            .collect();

        Self {
            run_unit: overrides.unit || args.unit,
            run_integ: overrides.integ || args.integ,
            log: overrides.log.or(args.log),
            tor_command: overrides.tor.clone().unwrap_or_else(|| args.tor.clone()),
            no_color: overrides.no_color || args.no_color,
            log_file: absolutize(base_dir, &settings.paths.log),
            data_directory,
            attributes,
            targets,
        }
    }

    /// `true` when neither suite is selected.
    pub fn is_empty(&self) -> bool {
        !self.run_unit && !self.run_integ
    }
}

impl fmt::Display for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "nothing to run: neither unit nor integration tests are selected");
        }

        let on_off = |b: bool| if b { "yes" } else { "no" };
        writeln!(f, "unit tests:        {}", on_off(self.run_unit))?;
        writeln!(f, "integration tests: {}", on_off(self.run_integ))?;
        match self.log {
            Some(level) => writeln!(f, "log runlevel:      {level}")?,
            None => writeln!(f, "log runlevel:      disabled")?,
        }

        if !self.run_integ {
            return Ok(());
        }

        writeln!(f, "tor command:       {}", self.tor_command)?;
        writeln!(f, "data directory:    {}", self.data_directory.display())?;
        writeln!(f, "log file:          {}", self.log_file.display())?;
        if !self.attributes.is_empty() {
            let names: Vec<&str> = self.attributes.iter().map(|a| a.setting_key()).collect();
            writeln!(f, "attributes:        {}", names.join(", "))?;
        }

        if self.targets.is_empty() {
            return writeln!(f, "targets:           none selected");
        }
        writeln!(f, "targets:")?;
        for plan in &self.targets {
            writeln!(f, "  {} ({})", plan.target, plan.description)?;
            for line in plan.torrc.lines() {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}

/// Drops `.` components, e.g. `./test/data` becomes `test/data`.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn absolutize(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_dir.join(path))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use torinteg_core::parse_str;

    fn settings(text: &str) -> RunnerSettings {
        RunnerSettings::from_document(&parse_str(text).unwrap()).unwrap()
    }

    fn base() -> &'static Path {
        Path::new("/work/stem")
    }

    #[test]
    fn test_defaults_run_nothing() {
        // Arrange
        let settings = RunnerSettings::defaults().unwrap();

        // Act
        let plan = RunPlan::resolve(&settings, &RunOverrides::default(), base());

        // Assert
        assert!(plan.is_empty());
        assert!(plan.to_string().starts_with("nothing to run"));
    }

    #[test]
    fn test_flags_switch_suites_on() {
        let settings = RunnerSettings::defaults().unwrap();
        let overrides = RunOverrides {
            integ: true,
            ..RunOverrides::default()
        };

        let plan = RunPlan::resolve(&settings, &overrides, base());

        assert!(plan.run_integ);
        assert!(!plan.run_unit);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_settings_default_is_kept_without_flag() {
        let plan = RunPlan::resolve(
            &settings("argument.unit true\nargument.log WARN"),
            &RunOverrides::default(),
            base(),
        );

        assert!(plan.run_unit);
        assert_eq!(plan.log, Some(Runlevel::Warn));
    }

    #[test]
    fn test_log_and_tor_flags_override_settings() {
        let overrides = RunOverrides {
            log: Some(Runlevel::Trace),
            tor: Some("/usr/local/bin/tor".to_string()),
            ..RunOverrides::default()
        };

        let plan = RunPlan::resolve(&settings("argument.log ERROR"), &overrides, base());

        assert_eq!(plan.log, Some(Runlevel::Trace));
        assert_eq!(plan.tor_command, "/usr/local/bin/tor");
    }

    #[test]
    fn test_paths_resolve_against_base_dir() {
        let plan = RunPlan::resolve(
            &RunnerSettings::defaults().unwrap(),
            &RunOverrides::default(),
            base(),
        );

        assert_eq!(plan.data_directory, PathBuf::from("/work/stem/test/data"));
        assert_eq!(plan.log_file, PathBuf::from("/work/stem/test/data/log"));
    }

    #[test]
    fn test_relative_data_dir_keeps_data_directory_relative() {
        let plan = RunPlan::resolve(
            &settings("integ.target.relative_data_dir true"),
            &RunOverrides::default(),
            base(),
        );

        assert_eq!(plan.data_directory, PathBuf::from("test/data"));
        assert_eq!(plan.attributes, vec![TargetAttribute::RelativeDataDir]);
        // The log file is not tor's concern and stays absolute.
        assert!(plan.log_file.is_absolute());
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let plan = RunPlan::resolve(
            &settings("integ.test_directory /tmp/integ\ninteg.log /var/log/integ.log"),
            &RunOverrides::default(),
            base(),
        );

        assert_eq!(plan.data_directory, PathBuf::from("/tmp/integ"));
        assert_eq!(plan.log_file, PathBuf::from("/var/log/integ.log"));
    }

    #[test]
    fn test_target_torrc_uses_resolved_data_directory() {
        let plan = RunPlan::resolve(
            &settings("integ.target.run.open false\ninteg.target.run.socket true"),
            &RunOverrides::default(),
            base(),
        );

        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.targets[0].target, RunTarget::Socket);
        assert!(plan.targets[0]
            .torrc
            .contains("ControlSocket /work/stem/test/data/socket"));
    }

    #[test]
    fn test_display_lists_targets_when_integ_runs() {
        let overrides = RunOverrides {
            integ: true,
            ..RunOverrides::default()
        };

        let text = RunPlan::resolve(&settings("integ.target.run.all true"), &overrides, base())
            .to_string();

        assert!(text.contains("integration tests: yes"));
        for target in RunTarget::ALL {
            assert!(text.contains(&format!("  {target} (")), "{target} must be listed");
        }
    }

    #[test]
    fn test_display_reports_no_targets() {
        let overrides = RunOverrides {
            integ: true,
            ..RunOverrides::default()
        };

        let text = RunPlan::resolve(&settings("integ.target.run.open false"), &overrides, base())
            .to_string();

        assert!(text.contains("targets:           none selected"));
    }
}

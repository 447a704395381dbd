//! torinteg — check and resolve tor integration-test settings.
//!
//! # Usage
//!
//! ```text
//! torinteg [OPTIONS] <COMMAND>
//!
//! Commands:
//!   check   Lint the settings file and confirm it yields valid settings
//!   show    Print the effective settings
//!   plan    Resolve command-line flags and settings into a run plan
//!   torrc   Print the torrc a run target is started with
//!
//! Options:
//!   --settings <PATH>      Settings file [default: test/settings.cfg]
//!   --set <KEY=VALUE>      Override a setting (repeatable)
//!   --base-dir <DIR>       Directory relative paths resolve against
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Default             | Description                 |
//! |----------------------|---------------------|-----------------------------|
//! | `TORINTEG_SETTINGS`  | `test/settings.cfg` | Settings file               |
//! | `TORINTEG_BASE_DIR`  | current directory   | Base for relative paths     |
//! | `RUST_LOG`           | `argument.log`      | Log filter, wins when set   |

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use torinteg_core::domain::keys;
use torinteg_core::domain::runner::{argument_runlevel, install};
use torinteg_core::{render_torrc, RunTarget, Runlevel, RunnerSettings, SettingsDocument};
use torinteg_runner::application::check::check;
use torinteg_runner::application::plan::{RunOverrides, RunPlan};
use torinteg_runner::infrastructure::logging;
use torinteg_runner::infrastructure::storage::settings_file::{
    load_layered, LayeredSettings, DEFAULT_SETTINGS_PATH,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Check and resolve tor integration-test settings.
#[derive(Debug, Parser)]
#[command(name = "torinteg", version)]
struct Cli {
    /// Settings file layered over the bundled defaults. A missing file is
    /// not an error.
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH, env = "TORINTEG_SETTINGS")]
    settings: PathBuf,

    /// Override a setting, e.g. `--set integ.target.run.all=true`.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Directory that relative paths in the settings resolve against.
    /// Defaults to the current directory.
    #[arg(long, env = "TORINTEG_BASE_DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lint the settings file and confirm it yields valid settings.
    Check {
        /// Fail on warnings (unknown keys) as well as errors.
        #[arg(long)]
        strict: bool,
    },

    /// Print the effective settings.
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Resolve command-line flags and settings into a run plan.
    Plan {
        /// Run unit tests.
        #[arg(long)]
        unit: bool,

        /// Run integration tests.
        #[arg(long)]
        integ: bool,

        /// Log runlevel (TRACE, DEBUG, INFO, NOTICE, WARN, ERROR).
        #[arg(long, value_name = "RUNLEVEL")]
        log: Option<Runlevel>,

        /// Tor binary to run integration tests against.
        #[arg(long, value_name = "PATH")]
        tor: Option<String>,

        /// Disable colored output.
        #[arg(long)]
        no_color: bool,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the torrc a run target is started with.
    Torrc {
        /// One of none, open, password, cookie, multiple, socket, scookie, ptrace.
        target: RunTarget,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Toml,
}

impl Cli {
    /// The `plan` command's flags; every other command runs with none.
    fn run_overrides(&self) -> RunOverrides {
        match &self.command {
            Command::Plan {
                unit,
                integ,
                log,
                tor,
                no_color,
                ..
            } => RunOverrides {
                unit: *unit,
                integ: *integ,
                log: *log,
                tor: tor.clone(),
                no_color: *no_color,
            },
            _ => RunOverrides::default(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let log = logging::init().context("failed to install the tracing subscriber")?;
    let cli = Cli::parse();
    let overrides = cli.run_overrides();

    let layered = load_layered(&cli.settings, &cli.overrides)
        .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;

    let (level, no_color) = log_preferences(&overrides, &layered.effective);
    log.apply(level, no_color)
        .context("failed to apply the log runlevel")?;

    let base_dir = match cli.base_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    match cli.command {
        Command::Check { strict } => run_check(&layered, strict),
        Command::Show { format } => run_show(&layered, format),
        Command::Plan { json, .. } => run_plan(&layered, &overrides, &base_dir, json),
        Command::Torrc { target } => run_torrc(&layered, target, &base_dir),
    }
}

/// Runlevel and color preference, read before the typed settings are built
/// so that warnings raised while building them reach the log.
///
/// Command-line flags win over the settings. A malformed `argument.log` or
/// `argument.no_color` counts as unset here; `check` reports it and the
/// other commands fail on it.
fn log_preferences(overrides: &RunOverrides, doc: &SettingsDocument) -> (Option<Runlevel>, bool) {
    let level = overrides
        .log
        .or_else(|| argument_runlevel(doc).ok().flatten());
    let no_color = overrides.no_color
        || doc
            .get_bool(keys::ARGUMENT_NO_COLOR)
            .ok()
            .flatten()
            .unwrap_or(false);
    (level, no_color)
}

/// Typed settings for the commands that need them, installed as this
/// process's runner settings.
fn install_settings(layered: &LayeredSettings) -> anyhow::Result<&'static RunnerSettings> {
    let settings = RunnerSettings::from_document(&layered.effective)
        .with_context(|| format!("invalid settings in {}", layered.path.display()))?;
    let installed = install(settings)?;
    Ok(installed)
}

fn run_check(layered: &LayeredSettings, strict: bool) -> anyhow::Result<ExitCode> {
    if layered.file.is_none() {
        info!(
            "{} does not exist, checking bundled defaults",
            layered.path.display()
        );
    }

    let report = check(layered.file.as_ref(), &layered.effective);
    println!("{report}");

    Ok(if report.is_failure(strict) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_show(layered: &LayeredSettings, format: OutputFormat) -> anyhow::Result<ExitCode> {
    install_settings(layered)?;

    let effective = layered.effective.effective();
    match format {
        OutputFormat::Text => {
            for (key, value) in &effective {
                if value.is_empty() {
                    println!("{key}");
                } else {
                    println!("{key} {value}");
                }
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&effective).context("failed to render JSON")?
            );
        }
        OutputFormat::Toml => {
            print!(
                "{}",
                toml::to_string_pretty(&effective).context("failed to render TOML")?
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_plan(
    layered: &LayeredSettings,
    overrides: &RunOverrides,
    base_dir: &std::path::Path,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let settings = install_settings(layered)?;
    let plan = RunPlan::resolve(settings, overrides, base_dir);
    debug!(
        "resolved plan with {} target(s) from {}",
        plan.targets.len(),
        layered.path.display()
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("failed to render JSON")?
        );
    } else {
        print!("{plan}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_torrc(
    layered: &LayeredSettings,
    target: RunTarget,
    base_dir: &std::path::Path,
) -> anyhow::Result<ExitCode> {
    let settings = install_settings(layered)?;
    let plan = RunPlan::resolve(settings, &RunOverrides::default(), base_dir);
    print!("{}", render_torrc(target, &plan.data_directory));
    Ok(ExitCode::SUCCESS)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use torinteg_core::parse_str;

    /// Serializes tests that read or change `TORINTEG_*` variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("TORINTEG_SETTINGS");
        std::env::remove_var("TORINTEG_BASE_DIR");
        guard
    }

    #[test]
    fn test_cli_defaults_settings_path_and_base_dir() {
        // Arrange
        let _env = clear_env();

        // Act
        let cli = Cli::parse_from(["torinteg", "check"]);

        // Assert
        assert_eq!(cli.settings, PathBuf::from("test/settings.cfg"));
        assert_eq!(cli.base_dir, None);
        assert!(cli.overrides.is_empty());
        assert!(matches!(cli.command, Command::Check { strict: false }));
    }

    #[test]
    fn test_cli_settings_and_base_dir_from_env() {
        // Arrange
        let _env = clear_env();
        std::env::set_var("TORINTEG_SETTINGS", "/etc/torinteg/settings.cfg");
        std::env::set_var("TORINTEG_BASE_DIR", "/srv/stem");

        // Act
        let cli = Cli::parse_from(["torinteg", "check"]);
        std::env::remove_var("TORINTEG_SETTINGS");
        std::env::remove_var("TORINTEG_BASE_DIR");

        // Assert
        assert_eq!(cli.settings, PathBuf::from("/etc/torinteg/settings.cfg"));
        assert_eq!(cli.base_dir, Some(PathBuf::from("/srv/stem")));
    }

    #[test]
    fn test_cli_flag_beats_env() {
        let _env = clear_env();
        std::env::set_var("TORINTEG_SETTINGS", "/etc/torinteg/settings.cfg");

        let cli = Cli::parse_from(["torinteg", "--settings", "local.cfg", "check"]);
        std::env::remove_var("TORINTEG_SETTINGS");

        assert_eq!(cli.settings, PathBuf::from("local.cfg"));
    }

    #[test]
    fn test_cli_set_is_repeatable() {
        let cli = Cli::parse_from([
            "torinteg",
            "--set",
            "integ.target.run.all=true",
            "--set",
            "argument.log=DEBUG",
            "show",
        ]);

        assert_eq!(
            cli.overrides,
            vec!["integ.target.run.all=true", "argument.log=DEBUG"]
        );
    }

    #[test]
    fn test_cli_plan_flags() {
        // Arrange / Act
        let cli = Cli::parse_from([
            "torinteg",
            "plan",
            "--unit",
            "--integ",
            "--log",
            "debug",
            "--tor",
            "/opt/tor",
            "--no-color",
            "--json",
        ]);

        // Assert
        match cli.command {
            Command::Plan {
                unit,
                integ,
                log,
                tor,
                no_color,
                json,
            } => {
                assert!(unit && integ && no_color && json);
                assert_eq!(log, Some(Runlevel::Debug));
                assert_eq!(tor.as_deref(), Some("/opt/tor"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_plan_defaults_to_no_overrides() {
        let cli = Cli::parse_from(["torinteg", "plan"]);
        let overrides = cli.run_overrides();
        assert!(!overrides.unit && !overrides.integ && !overrides.no_color);
        assert_eq!(overrides.log, None);
        assert_eq!(overrides.tor, None);
    }

    #[test]
    fn test_cli_log_accepts_notice_in_any_case() {
        let cli = Cli::parse_from(["torinteg", "plan", "--log", "Notice"]);
        assert_eq!(cli.run_overrides().log, Some(Runlevel::Notice));
    }

    #[test]
    fn test_cli_unknown_runlevel_is_rejected() {
        assert!(Cli::try_parse_from(["torinteg", "plan", "--log", "loud"]).is_err());
    }

    #[test]
    fn test_cli_torrc_target() {
        let cli = Cli::parse_from(["torinteg", "torrc", "cookie"]);
        assert!(matches!(
            cli.command,
            Command::Torrc {
                target: RunTarget::Cookie
            }
        ));
    }

    #[test]
    fn test_cli_unknown_torrc_target_is_rejected() {
        assert!(Cli::try_parse_from(["torinteg", "torrc", "telnet"]).is_err());
    }

    #[test]
    fn test_cli_show_format() {
        let text = Cli::parse_from(["torinteg", "show"]);
        let json = Cli::parse_from(["torinteg", "show", "--format", "json"]);
        let toml = Cli::parse_from(["torinteg", "show", "--format", "toml"]);

        assert!(matches!(text.command, Command::Show { format: OutputFormat::Text }));
        assert!(matches!(json.command, Command::Show { format: OutputFormat::Json }));
        assert!(matches!(toml.command, Command::Show { format: OutputFormat::Toml }));
        assert!(Cli::try_parse_from(["torinteg", "show", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_non_plan_commands_have_no_overrides() {
        let cli = Cli::parse_from(["torinteg", "torrc", "open"]);
        let overrides = cli.run_overrides();
        assert_eq!(overrides.log, None);
        assert!(!overrides.no_color);
    }

    #[test]
    fn test_log_preferences_come_from_settings() {
        // Arrange
        let doc = parse_str("argument.log WARN\nargument.no_color true").unwrap();

        // Act
        let (level, no_color) = log_preferences(&RunOverrides::default(), &doc);

        // Assert
        assert_eq!(level, Some(Runlevel::Warn));
        assert!(no_color);
    }

    #[test]
    fn test_log_preferences_flags_win() {
        let doc = parse_str("argument.log ERROR").unwrap();
        let overrides = RunOverrides {
            log: Some(Runlevel::Trace),
            no_color: true,
            ..RunOverrides::default()
        };

        assert_eq!(log_preferences(&overrides, &doc), (Some(Runlevel::Trace), true));
    }

    #[test]
    fn test_log_preferences_ignore_malformed_values() {
        let doc = parse_str("argument.log chatty\nargument.no_color maybe").unwrap();
        assert_eq!(log_preferences(&RunOverrides::default(), &doc), (None, false));
    }
}

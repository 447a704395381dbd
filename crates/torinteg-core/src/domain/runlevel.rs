//! Logging thresholds accepted by `argument.log`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Logging threshold, from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Runlevel {
    Trace,
    Debug,
    Info,
    Notice,
    Warn,
    Error,
}

/// Returned when parsing a name that is not a runlevel.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized runlevel {0:?} (expected TRACE, DEBUG, INFO, NOTICE, WARN, or ERROR)")]
pub struct UnknownRunlevel(pub String);

impl Runlevel {
    /// Every runlevel, most verbose first.
    pub const ALL: [Runlevel; 6] = [
        Runlevel::Trace,
        Runlevel::Debug,
        Runlevel::Info,
        Runlevel::Notice,
        Runlevel::Warn,
        Runlevel::Error,
    ];

    /// Canonical upper-case name, as written in settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            Runlevel::Trace => "TRACE",
            Runlevel::Debug => "DEBUG",
            Runlevel::Info => "INFO",
            Runlevel::Notice => "NOTICE",
            Runlevel::Warn => "WARN",
            Runlevel::Error => "ERROR",
        }
    }

    /// The `tracing` filter directive for this runlevel.
    ///
    /// `tracing` has no NOTICE level, so NOTICE maps onto `info`.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Runlevel::Trace => "trace",
            Runlevel::Debug => "debug",
            Runlevel::Info | Runlevel::Notice => "info",
            Runlevel::Warn => "warn",
            Runlevel::Error => "error",
        }
    }
}

impl FromStr for Runlevel {
    type Err = UnknownRunlevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Runlevel::Trace),
            "DEBUG" => Ok(Runlevel::Debug),
            "INFO" => Ok(Runlevel::Info),
            "NOTICE" => Ok(Runlevel::Notice),
            "WARN" | "WARNING" => Ok(Runlevel::Warn),
            "ERR" | "ERROR" => Ok(Runlevel::Error),
            _ => Err(UnknownRunlevel(s.to_string())),
        }
    }
}

impl fmt::Display for Runlevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

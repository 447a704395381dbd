//! Connection targets exercised by the integration suite.
//!
//! Each `integ.target.run.*` flag names one way of reaching tor's control
//! interface: over a port or a unix socket, with no authentication, a
//! password, a cookie, or several at once. A target translates into the torrc
//! options the test tor instance is started with.
//!
//! Target *attributes* (`online`, `relative_data_dir`, `chroot`) are not
//! connection methods; they change how every selected target is run.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::keys;

/// Control port opened by the port-based targets.
pub const CONTROL_PORT: u16 = 1111;
/// Plaintext control password for the password-based targets.
pub const CONTROL_PASSWORD: &str = "pw";
/// `HashedControlPassword` value for [`CONTROL_PASSWORD`].
pub const CONTROL_PASSWORD_HASH: &str =
    "16:8C423A41EF4A542C6078985270AE28A4E04D056FB63F9F201505DB8E06";
/// Name of the control socket, created inside the data directory.
pub const CONTROL_SOCKET_NAME: &str = "socket";

/// One torrc option contributed by a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TorrcOption {
    Port,
    Password,
    Cookie,
    Socket,
    Ptrace,
}

impl TorrcOption {
    fn render(self, data_dir: &Path) -> String {
        match self {
            TorrcOption::Port => format!("ControlPort {CONTROL_PORT}"),
            TorrcOption::Password => format!("HashedControlPassword {CONTROL_PASSWORD_HASH}"),
            TorrcOption::Cookie => "CookieAuthentication 1".to_string(),
            TorrcOption::Socket => {
                format!("ControlSocket {}", data_dir.join(CONTROL_SOCKET_NAME).display())
            }
            TorrcOption::Ptrace => "DisableDebuggerAttachment 0".to_string(),
        }
    }
}

/// A connection/authentication scenario selected by `integ.target.run.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunTarget {
    /// No control interface at all.
    None,
    Open,
    Password,
    Cookie,
    Multiple,
    Socket,
    Scookie,
    Ptrace,
}

/// Returned when parsing a name that is not in the catalogue.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run target {0:?}")]
pub struct UnknownTarget(pub String);

impl RunTarget {
    /// Every run target, in catalogue order.
    pub const ALL: [RunTarget; 8] = [
        RunTarget::None,
        RunTarget::Open,
        RunTarget::Password,
        RunTarget::Cookie,
        RunTarget::Multiple,
        RunTarget::Socket,
        RunTarget::Scookie,
        RunTarget::Ptrace,
    ];

    /// Lower-case name, matching the setting key's last segment.
    pub fn name(self) -> &'static str {
        match self {
            RunTarget::None => "none",
            RunTarget::Open => "open",
            RunTarget::Password => "password",
            RunTarget::Cookie => "cookie",
            RunTarget::Multiple => "multiple",
            RunTarget::Socket => "socket",
            RunTarget::Scookie => "scookie",
            RunTarget::Ptrace => "ptrace",
        }
    }

    /// The `integ.target.run.*` key that enables this target.
    pub fn setting_key(self) -> &'static str {
        match self {
            RunTarget::None => keys::RUN_NONE,
            RunTarget::Open => keys::RUN_OPEN,
            RunTarget::Password => keys::RUN_PASSWORD,
            RunTarget::Cookie => keys::RUN_COOKIE,
            RunTarget::Multiple => keys::RUN_MULTIPLE,
            RunTarget::Socket => keys::RUN_SOCKET,
            RunTarget::Scookie => keys::RUN_SCOOKIE,
            RunTarget::Ptrace => keys::RUN_PTRACE,
        }
    }

    /// Looks a target up by the last segment of its setting key.
    pub fn from_leaf(leaf: &str) -> Option<RunTarget> {
        RunTarget::ALL.into_iter().find(|t| t.name() == leaf)
    }

    /// One-line summary for listings.
    pub fn description(self) -> &'static str {
        match self {
            RunTarget::None => "tor without a control port or socket",
            RunTarget::Open => "control port without authentication",
            RunTarget::Password => "control port with password authentication",
            RunTarget::Cookie => "control port with cookie authentication",
            RunTarget::Multiple => "control port with password and cookie authentication",
            RunTarget::Socket => "control socket without authentication",
            RunTarget::Scookie => "control socket with cookie authentication",
            RunTarget::Ptrace => "control port with debugger attachment allowed",
        }
    }

    fn options(self) -> &'static [TorrcOption] {
        use TorrcOption::*;
        match self {
            RunTarget::None => &[],
            RunTarget::Open => &[Port],
            RunTarget::Password => &[Port, Password],
            RunTarget::Cookie => &[Port, Cookie],
            RunTarget::Multiple => &[Port, Password, Cookie],
            RunTarget::Socket => &[Socket],
            RunTarget::Scookie => &[Socket, Cookie],
            RunTarget::Ptrace => &[Port, Ptrace],
        }
    }

    /// The torrc lines this target adds to the base configuration.
    pub fn torrc_options(self, data_dir: &Path) -> Vec<String> {
        self.options().iter().map(|o| o.render(data_dir)).collect()
    }

    /// Whether the target exposes a TCP control port.
    pub fn has_control_port(self) -> bool {
        self.options().contains(&TorrcOption::Port)
    }

    /// Whether the target exposes a unix control socket.
    pub fn has_control_socket(self) -> bool {
        self.options().contains(&TorrcOption::Socket)
    }

    /// Whether connecting requires authenticating.
    pub fn requires_auth(self) -> bool {
        self.options()
            .iter()
            .any(|o| matches!(o, TorrcOption::Password | TorrcOption::Cookie))
    }
}

impl FromStr for RunTarget {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunTarget::from_leaf(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| UnknownTarget(s.to_string()))
    }
}

impl fmt::Display for RunTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders the full torrc for `target` with its data in `data_dir`.
///
/// ```rust
/// use std::path::Path;
/// use torinteg_core::domain::target::{render_torrc, RunTarget};
///
/// let torrc = render_torrc(RunTarget::Cookie, Path::new("/tmp/integ"));
/// assert_eq!(
///     torrc,
///     "DataDirectory /tmp/integ\nSocksPort 0\nControlPort 1111\nCookieAuthentication 1\n"
/// );
/// ```
pub fn render_torrc(target: RunTarget, data_dir: &Path) -> String {
    let mut torrc = format!("DataDirectory {}\nSocksPort 0\n", data_dir.display());
    for option in target.torrc_options(data_dir) {
        torrc.push_str(&option);
        torrc.push('\n');
    }
    torrc
}

/// Modifiers applied to every selected run target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAttribute {
    /// Allow tests that need network access.
    Online,
    /// Hand tor a relative data directory instead of an absolute one.
    RelativeDataDir,
    /// Run as though tor were in a chroot.
    Chroot,
}

impl TargetAttribute {
    /// Every attribute, in settings-file order.
    pub const ALL: [TargetAttribute; 3] = [
        TargetAttribute::Online,
        TargetAttribute::RelativeDataDir,
        TargetAttribute::Chroot,
    ];

    /// The `integ.target.*` key holding this attribute.
    pub fn setting_key(self) -> &'static str {
        match self {
            TargetAttribute::Online => keys::TARGET_ONLINE,
            TargetAttribute::RelativeDataDir => keys::TARGET_RELATIVE_DATA_DIR,
            TargetAttribute::Chroot => keys::TARGET_CHROOT,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TargetAttribute::Online => "include tests that require network access",
            TargetAttribute::RelativeDataDir => "use a relative path for tor's data directory",
            TargetAttribute::Chroot => "simulate a chroot setup",
        }
    }
}

//! Names of the settings the runner recognizes.

pub const ARGUMENT_UNIT: &str = "argument.unit";
pub const ARGUMENT_INTEG: &str = "argument.integ";
pub const ARGUMENT_LOG: &str = "argument.log";
pub const ARGUMENT_TOR: &str = "argument.tor";
pub const ARGUMENT_NO_COLOR: &str = "argument.no_color";

pub const INTEG_TEST_DIRECTORY: &str = "integ.test_directory";
pub const INTEG_LOG: &str = "integ.log";

pub const TARGET_ONLINE: &str = "integ.target.online";
pub const TARGET_RELATIVE_DATA_DIR: &str = "integ.target.relative_data_dir";
pub const TARGET_CHROOT: &str = "integ.target.chroot";

/// Namespace of the per-target run flags.
pub const RUN_NAMESPACE: &str = "integ.target.run";
/// Selects every run target when `true`.
pub const RUN_ALL: &str = "integ.target.run.all";

pub const RUN_NONE: &str = "integ.target.run.none";
pub const RUN_OPEN: &str = "integ.target.run.open";
pub const RUN_PASSWORD: &str = "integ.target.run.password";
pub const RUN_COOKIE: &str = "integ.target.run.cookie";
pub const RUN_MULTIPLE: &str = "integ.target.run.multiple";
pub const RUN_SOCKET: &str = "integ.target.run.socket";
pub const RUN_SCOOKIE: &str = "integ.target.run.scookie";
pub const RUN_PTRACE: &str = "integ.target.run.ptrace";

/// Keys that only accept `true` or `false`.
pub const BOOLEAN_KEYS: &[&str] = &[
    ARGUMENT_UNIT,
    ARGUMENT_INTEG,
    ARGUMENT_NO_COLOR,
    TARGET_ONLINE,
    TARGET_RELATIVE_DATA_DIR,
    TARGET_CHROOT,
    RUN_NONE,
    RUN_OPEN,
    RUN_PASSWORD,
    RUN_COOKIE,
    RUN_MULTIPLE,
    RUN_SOCKET,
    RUN_SCOOKIE,
    RUN_PTRACE,
    RUN_ALL,
];

/// Keys holding file system paths.
pub const PATH_KEYS: &[&str] = &[INTEG_TEST_DIRECTORY, INTEG_LOG];

/// Every recognized key.
pub const KNOWN_KEYS: &[&str] = &[
    ARGUMENT_UNIT,
    ARGUMENT_INTEG,
    ARGUMENT_LOG,
    ARGUMENT_TOR,
    ARGUMENT_NO_COLOR,
    INTEG_TEST_DIRECTORY,
    INTEG_LOG,
    TARGET_ONLINE,
    TARGET_RELATIVE_DATA_DIR,
    TARGET_CHROOT,
    RUN_NONE,
    RUN_OPEN,
    RUN_PASSWORD,
    RUN_COOKIE,
    RUN_MULTIPLE,
    RUN_SOCKET,
    RUN_SCOOKIE,
    RUN_PTRACE,
    RUN_ALL,
];

pub fn is_known(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

pub fn is_boolean(key: &str) -> bool {
    BOOLEAN_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_boolean_key_is_known() {
        for key in BOOLEAN_KEYS {
            assert!(is_known(key), "{key} must be in KNOWN_KEYS");
        }
    }

    #[test]
    fn test_known_keys_are_unique() {
        let mut keys = KNOWN_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), KNOWN_KEYS.len());
    }

    #[test]
    fn test_string_valued_keys_are_not_boolean() {
        assert!(!is_boolean(ARGUMENT_LOG));
        assert!(!is_boolean(ARGUMENT_TOR));
        assert!(!is_boolean(INTEG_LOG));
    }
}

//! # torinteg-runner
//!
//! Command-line front end for tor integration-test settings.
//!
//! The `torinteg` binary loads the bundled defaults, layers the settings file
//! and any `--set` overrides on top, and then checks the result, shows it, or
//! resolves it into the plan a run would follow.
//!
//! ```text
//! torinteg-runner
//!   application/     check reports, run-plan resolution
//!   infrastructure/
//!     storage/       settings file loading and layering
//! ```

pub mod application;
pub mod infrastructure;

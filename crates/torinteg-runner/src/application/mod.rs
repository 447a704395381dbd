//! Application layer: use cases built on the typed settings.
//!
//! - `check` – lint a settings file and confirm it yields valid settings.
//! - `plan`  – merge command-line flags over the settings into a run plan.

pub mod check;
pub mod plan;

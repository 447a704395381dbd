//! What the runner's settings mean.
//!
//! - [`keys`] names every recognized setting.
//! - [`target`] is the catalogue of connection targets and target attributes,
//!   including the torrc each target needs.
//! - [`runner`] turns a parsed document into the immutable [`runner::RunnerSettings`].

pub mod keys;
pub mod runlevel;
pub mod runner;
pub mod target;

//! Storage infrastructure: settings file persistence.
//!
//! The `settings_file` sub-module reads the settings file from disk, layers
//! it over the bundled defaults, and applies command-line overrides.

pub mod settings_file;

//! Run configuration.
//!
//! Settings come from an optional TOML file overlaid with `TRANSPACK_*`
//! environment variables; command line flags are applied on top by the
//! binary after validation.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
pub use validate::validate_config;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file {path} does not exist")]
    FileNotFound { path: PathBuf },

    /// The file or environment could not be read into a `Config`.
    #[error("Could not read configuration: {reason}")]
    Parse { reason: String },

    /// A setting has a value transpack cannot run with.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

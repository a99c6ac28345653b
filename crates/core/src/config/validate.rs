use super::{types::Config, ConfigError};
use crate::formats::Format;

/// Rejects settings a run cannot start with: a zero poll interval, an
/// unknown format name, or transcoding enabled with no formats.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.transcode.poll_interval_ms == 0 {
        return Err(ConfigError::invalid(
            "transcode.poll_interval_ms",
            "must be at least 1",
        ));
    }

    for name in &config.transcode.formats {
        if let Err(e) = name.parse::<Format>() {
            return Err(ConfigError::invalid("transcode.formats", e.to_string()));
        }
    }

    if config.transcode.enabled && config.transcode.formats.is_empty() {
        return Err(ConfigError::invalid(
            "transcode.formats",
            "cannot be empty when transcoding is enabled",
        ));
    }

    Ok(())
}

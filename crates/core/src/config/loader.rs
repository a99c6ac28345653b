use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration with environment variable overrides.
///
/// Without a path only built-in defaults and the environment are used.
/// Nested keys are separated by a double underscore, e.g.
/// `TRANSPACK_TORRENT__ANNOUNCE`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed("TRANSPACK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TorrentMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[transcode]
formats = ["v0", "alac"]
max_parallel = 4

[torrent]
mode = "all"
announce = "https://tracker.example/announce"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.transcode.formats, ["v0", "alac"]);
        assert_eq!(config.transcode.max_parallel, 4);
        assert_eq!(config.torrent.mode, TorrentMode::All);
        assert!(config.transcode.enabled);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.transcode.formats, ["320", "v0"]);
        assert_eq!(config.torrent.mode, TorrentMode::Transcodes);
        assert_eq!(config.transcode.poll_interval_ms, 50);
    }

    #[test]
    fn test_load_config_from_str_bad_mode() {
        let result = load_config_from_str("[torrent]\nmode = \"sometimes\"\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref reason } if reason.contains("sometimes")));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::FileNotFound { ref path } if path == Path::new("/nonexistent/config.toml"))
        );
        assert_eq!(
            err.to_string(),
            "Config file /nonexistent/config.toml does not exist"
        );
    }

    #[test]
    fn test_load_config_without_file() {
        let config = load_config(None).unwrap();
        assert!(!config.transcode.formats.is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[output]
torrent_dir = "/srv/torrents"

[naming]
prefix = "RB "
snip_prefixes = ["FL ", "UL "]
"#
        )
        .unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.output.torrent_dir, Path::new("/srv/torrents"));
        assert_eq!(config.naming.prefix, "RB ");
        assert_eq!(config.naming.snip_prefixes.len(), 2);
    }
}

// Process-wide server configuration.
//
// `ServerConfig` is read once at startup: defaults, then an optional JSON
// file, then command-line overrides applied by `main.rs`. Every field has a
// default, so a config file only needs the keys it changes. Game rules (the
// 20-question budget, two participants per session) are not configurable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Listen port used by the lobby when nothing else is configured.
pub const DEFAULT_LOBBY_PORT: u16 = 9999;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface the lobby and every session listener bind to.
    pub bind_host: String,
    /// Lobby listen port. Port 0 lets the OS pick one (used by tests).
    pub lobby_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".into(),
            lobby_port: DEFAULT_LOBBY_PORT,
        }
    }
}

impl ServerConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Config for tests: loopback only, OS-assigned lobby port.
    pub fn local_ephemeral() -> Self {
        Self {
            bind_host: "127.0.0.1".into(),
            lobby_port: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_lobby() {
        let config = ServerConfig::default();
        assert_eq!(config.lobby_port, 9999);
        assert_eq!(config.bind_host, "0.0.0.0");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ServerConfig::from_json(r#"{"lobby_port": 4000}"#).unwrap();
        assert_eq!(config.lobby_port, 4000);
        assert_eq!(config.bind_host, "0.0.0.0");
    }

    #[test]
    fn empty_object_is_default() {
        let config = ServerConfig::from_json("{}").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(ServerConfig::from_json(r#"{"lobby_port": 70000}"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("twenty-questions-no-such-config.json");
        let err = ServerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "twenty-questions-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"bind_host": "127.0.0.1", "lobby_port": 12345}"#).unwrap();
        let config = ServerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.bind_host, "127.0.0.1");
        assert_eq!(config.lobby_port, 12345);
    }

    #[test]
    fn load_reports_bad_json() {
        let path = std::env::temp_dir().join(format!(
            "twenty-questions-bad-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }
}

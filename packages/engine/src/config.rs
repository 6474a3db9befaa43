use canvas_protocol::StyleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::EngineError;

pub const DEFAULT_CONFIG_NAME: &str = "canvas.config.json";
pub const DEFAULT_ORIGIN: &str = "canvas://builder";

/// Engine configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of history entries per page
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Quiet period before a burst of text edits becomes one history entry
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long the authority holds back content updates for an element the
    /// surface just edited
    #[serde(default = "default_echo_suppression_ms")]
    pub echo_suppression_ms: u64,

    /// Origin stamped on outgoing frames and required on incoming ones
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Global styling forwarded to the surface with every full sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_config: Option<StyleConfig>,
}

fn default_history_capacity() -> usize {
    50
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_echo_suppression_ms() -> u64 {
    100
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

impl EngineConfig {
    /// Load config from a directory, or defaults when no file exists
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        Self::load_file(&dir.join(DEFAULT_CONFIG_NAME))
    }

    pub fn load_file(path: &Path) -> Result<Self, EngineError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EngineConfig::default())
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn echo_suppression(&self) -> Duration {
        Duration::from_millis(self.echo_suppression_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            debounce_ms: default_debounce_ms(),
            echo_suppression_ms: default_echo_suppression_ms(),
            origin: default_origin(),
            style_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r##"{
            "historyCapacity": 10,
            "debounceMs": 250,
            "origin": "https://builder.example",
            "styleConfig": { "primary": "#3366FF" }
        }"##;

        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.echo_suppression_ms, 100);
        assert_eq!(config.origin, "https://builder.example");
        assert_eq!(
            config.style_config.unwrap().get("primary").unwrap(),
            "#3366FF"
        );
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.echo_suppression_ms, 100);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "echoSuppressionMs": 40 }"#,
        )
        .unwrap();

        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.echo_suppression_ms, 40);
        assert_eq!(config.history_capacity, 50);
    }
}

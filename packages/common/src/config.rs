use crate::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "campaign.config.json";

/// Builder configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderConfig {
    #[serde(default)]
    pub history: HistorySettings,

    #[serde(default)]
    pub drag: DragSettings,

    #[serde(default)]
    pub resources: ResourceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySettings {
    /// Maximum number of undo levels kept
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Keystroke coalescing window in milliseconds (`null` = boundary-only)
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSettings {
    /// Pointer travel (px) required before a press becomes a drag
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSettings {
    /// Prefix used for client-generated phantom ids
    #[serde(default = "default_temp_id_prefix")]
    pub temp_id_prefix: String,
}

fn default_max_entries() -> usize {
    100
}

fn default_coalesce_window_ms() -> Option<u64> {
    Some(1000)
}

fn default_activation_distance() -> f64 {
    5.0
}

fn default_temp_id_prefix() -> String {
    "temp".to_string()
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            coalesce_window_ms: default_coalesce_window_ms(),
        }
    }
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            activation_distance: default_activation_distance(),
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            temp_id_prefix: default_temp_id_prefix(),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            history: HistorySettings::default(),
            drag: DragSettings::default(),
            resources: ResourceSettings::default(),
        }
    }
}

impl BuilderConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> CommonResult<Self> {
        let config_path = Self::path_in(dir);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> CommonResult<Self> {
        let mut config: BuilderConfig = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Write config into a directory
    pub fn save(&self, dir: impl AsRef<Path>) -> CommonResult<PathBuf> {
        let config_path = Self::path_in(dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(DEFAULT_CONFIG_NAME)
    }

    fn normalize(&mut self) {
        if self.history.max_entries == 0 {
            tracing::warn!("history.maxEntries must be at least 1, using 1");
            self.history.max_entries = 1;
        }
    }

    fn validate(&self) -> CommonResult<()> {
        if !self.drag.activation_distance.is_finite() || self.drag.activation_distance < 0.0 {
            return Err(CommonError::InvalidConfig(format!(
                "drag.activationDistance must be a non-negative number, got {}",
                self.drag.activation_distance
            )));
        }

        if self.resources.temp_id_prefix.is_empty() {
            return Err(CommonError::InvalidConfig(
                "resources.tempIdPrefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "history": { "maxEntries": 20, "coalesceWindowMs": null },
            "drag": { "activationDistance": 8 },
            "resources": { "tempIdPrefix": "optimistic" }
        }"#;

        let config = BuilderConfig::from_json(json).unwrap();
        assert_eq!(config.history.max_entries, 20);
        assert_eq!(config.history.coalesce_window_ms, None);
        assert_eq!(config.drag.activation_distance, 8.0);
        assert_eq!(config.resources.temp_id_prefix, "optimistic");
    }

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::from_json("{}").unwrap();
        assert_eq!(config, BuilderConfig::default());
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(config.history.coalesce_window_ms, Some(1000));
    }

    #[test]
    fn test_zero_max_entries_is_raised() {
        let config = BuilderConfig::from_json(r#"{ "history": { "maxEntries": 0 } }"#).unwrap();
        assert_eq!(config.history.max_entries, 1);
    }

    #[test]
    fn test_negative_activation_distance_rejected() {
        let result = BuilderConfig::from_json(r#"{ "drag": { "activationDistance": -1 } }"#);
        assert!(matches!(result, Err(CommonError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig::load(dir.path()).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BuilderConfig::default();
        config.history.max_entries = 7;

        let path = config.save(dir.path()).unwrap();
        assert!(path.ends_with(DEFAULT_CONFIG_NAME));

        let loaded = BuilderConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.history.max_entries, 7);
    }
}

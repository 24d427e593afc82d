use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_AREA_ID, DEFAULT_MERGE_DISTANCE_M, DEFAULT_OVERPASS_URL, DEFAULT_QUERY_TIMEOUT_SECONDS,
    OVERPASS_URL_ENV,
};
use crate::error::{MilestoneError, Result};
use crate::pipeline::MergeConfig;
use crate::types::MotorwayConfig;

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Prepended to every motorway name when matching ways, e.g. `"autostrada"`
    pub motorway_prefix: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_area_id")]
    pub area_id: u64,
    #[serde(default = "default_query_timeout_seconds")]
    pub query_timeout_seconds: u64,
    #[serde(default = "default_merge_distance_m")]
    pub merge_distance_m: f64,
}

fn default_overpass_url() -> String {
    DEFAULT_OVERPASS_URL.to_string()
}

fn default_area_id() -> u64 {
    DEFAULT_AREA_ID
}

fn default_query_timeout_seconds() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECONDS
}

fn default_merge_distance_m() -> f64 {
    DEFAULT_MERGE_DISTANCE_M
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MilestoneError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let mut settings = Self::from_toml_str(&content)?;
        settings.apply_env_overrides();
        settings.validate()?;

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(OVERPASS_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("Overpass endpoint overridden by {}", OVERPASS_URL_ENV);
                self.overpass_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.motorway_prefix.trim().is_empty() {
            return Err(MilestoneError::Config("motorway_prefix must not be empty".to_string()));
        }
        if self.overpass_url.trim().is_empty() {
            return Err(MilestoneError::Config("overpass_url must not be empty".to_string()));
        }
        MergeConfig::new(self.merge_distance_m)?;
        Ok(())
    }

    pub fn merge_config(&self) -> MergeConfig {
        MergeConfig {
            max_distance_m: self.merge_distance_m,
        }
    }
}

/// Read the motorway list (`[{ "name", "ranges", "are_doubles"? }]`)
pub fn load_motorways(path: impl AsRef<Path>) -> Result<Vec<MotorwayConfig>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        MilestoneError::Config(format!("Failed to read motorway list '{}': {}", path.display(), e))
    })?;
    let motorways: Vec<MotorwayConfig> = serde_json::from_str(&content)?;
    info!("Loaded {} motorways from {}", motorways.len(), path.display());
    Ok(motorways)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Range;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_apply() {
        let settings = Settings::from_toml_str("motorway_prefix = \"autostrada\"").unwrap();

        assert_eq!(settings.motorway_prefix, "autostrada");
        assert_eq!(settings.overpass_url, DEFAULT_OVERPASS_URL);
        assert_eq!(settings.area_id, DEFAULT_AREA_ID);
        assert_eq!(settings.query_timeout_seconds, 25);
        assert_eq!(settings.merge_config(), MergeConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_prefix_is_required() {
        assert!(matches!(
            Settings::from_toml_str("area_id = 1"),
            Err(MilestoneError::Toml(_))
        ));

        let settings = Settings::from_toml_str("motorway_prefix = \" \"").unwrap();
        assert!(matches!(settings.validate(), Err(MilestoneError::Config(_))));
    }

    #[test]
    fn test_negative_merge_distance_is_rejected() {
        let settings =
            Settings::from_toml_str("motorway_prefix = \"A\"\nmerge_distance_m = -1.0").unwrap();
        assert!(settings.validate().is_err());

        let settings =
            Settings::from_toml_str("motorway_prefix = \"A\"\nmerge_distance_m = nan").unwrap();
        assert!(matches!(settings.validate(), Err(MilestoneError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/definitely/not/here/config.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_motorways() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "A1", "ranges": [[0, 10], [12, 20]], "are_doubles": true}}, {{"name": "A2", "ranges": []}}]"#
        )
        .unwrap();

        let motorways = load_motorways(file.path()).unwrap();

        assert_eq!(motorways.len(), 2);
        assert_eq!(motorways[0].ranges, vec![Range::new(0, 10), Range::new(12, 20)]);
        assert!(motorways[0].are_doubles);
        assert!(!motorways[1].are_doubles);
    }
}

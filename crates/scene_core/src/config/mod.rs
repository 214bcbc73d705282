//! Configuration system
//!
//! [`SceneConfig`] carries the tunables of a [`Scene`](crate::scene::Scene);
//! any config type can be loaded from or saved to TOML or RON through the
//! [`Config`] trait.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was parsed but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Self/children gate pair for one functionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Gate for the node's own hook
    #[serde(rename = "self")]
    pub self_: bool,
    /// Gate for recursion into children
    pub children: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            self_: true,
            children: true,
        }
    }
}

/// Initial functionality mask given to newly created nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionalityConfig {
    /// Event handling gates
    pub event_handling: TargetConfig,
    /// Update gates
    pub updating: TargetConfig,
    /// Render gates
    pub rendering: TargetConfig,
}

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Z-index given to the root by a full z-ordering pass
    pub z_origin: i32,
    /// Increment between successive z-indices; must be at least 1
    pub z_step: i32,
    /// Functionality mask of new nodes
    pub default_functionality: FunctionalityConfig,
    /// `env_logger` filter used by hosts that initialise logging from config
    pub log_filter: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            z_origin: 0,
            z_step: 1,
            default_functionality: FunctionalityConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Reject values the scene cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.z_step < 1 {
            return Err(ConfigError::Invalid(format!(
                "z_step must be >= 1, got {}",
                self.z_step
            )));
        }
        Ok(())
    }

    /// Load and validate in one step
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        log::info!("loaded scene config from {path}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.z_step, 1);
        assert!(config.default_functionality.rendering.children);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SceneConfig = toml::from_str(
            r#"
            z_step = 10

            [default_functionality.event_handling]
            self = false
            "#,
        )
        .unwrap();

        assert_eq!(config.z_step, 10);
        assert_eq!(config.z_origin, 0);
        assert!(!config.default_functionality.event_handling.self_);
        assert!(config.default_functionality.event_handling.children);
        assert!(config.default_functionality.updating.self_);
    }

    #[test]
    fn test_ron_parse() {
        let config: SceneConfig = ron::from_str("(z_origin: -100, log_filter: \"debug\")").unwrap();
        assert_eq!(config.z_origin, -100);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = SceneConfig {
            z_step: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SceneConfig::default().save_to_file("scene.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}

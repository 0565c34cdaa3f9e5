//! Cache configuration.
use crate::error::{CacheError, Result};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How far past an entity's last sample a query may reach and still be
/// answered with that sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StalenessPolicy {
    /// Window is the entity's mean sampling interval times `tolerance`.
    MeanInterval {
        #[serde(default = "StalenessPolicy::default_tolerance")]
        tolerance: f64,
    },
    /// Window is a fixed number of seconds for every entity.
    Fixed { seconds: f64 },
    /// The last sample answers every later query.
    Unbounded,
}

impl StalenessPolicy {
    const fn default_tolerance() -> f64 {
        1.0
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match *self {
            StalenessPolicy::MeanInterval { tolerance } => {
                if !tolerance.is_finite() || tolerance < 0.0 {
                    return Err(format!(
                        "Staleness tolerance must be a non-negative number, got {}",
                        tolerance
                    ));
                }
            }
            StalenessPolicy::Fixed { seconds } => {
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(format!(
                        "Staleness window must be a non-negative number of seconds, got {}",
                        seconds
                    ));
                }
            }
            StalenessPolicy::Unbounded => {}
        }
        Ok(())
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        StalenessPolicy::MeanInterval {
            tolerance: Self::default_tolerance(),
        }
    }
}

/// Sample cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub staleness: StalenessPolicy,

    /// Number of entities to reserve room for up front
    #[serde(default = "CacheConfig::default_entity_capacity")]
    pub entity_capacity: usize,
}

impl CacheConfig {
    const fn default_entity_capacity() -> usize {
        32
    }

    pub fn with_staleness(mut self, policy: StalenessPolicy) -> Self {
        if let StalenessPolicy::MeanInterval { tolerance } = policy
            && tolerance > 10.0
        {
            log::warn!(
                "Staleness tolerance of {} lets queries run {}x the sampling interval \
                past the last sample.",
                tolerance,
                tolerance
            );
        }
        self.staleness = policy;
        self
    }

    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.staleness.validate()
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: CacheConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: CacheConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a configuration file, picking the format from its extension.
    ///
    /// `.toml` files need the `toml` feature; anything else is read as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            #[cfg(feature = "toml")]
            Some("toml") => {
                Self::from_toml(&contents).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            #[cfg(not(feature = "toml"))]
            Some("toml") => Err(CacheError::InvalidConfig(format!(
                "{} is TOML but the `toml` feature is disabled",
                path.display()
            ))),
            _ => Self::from_json(&contents)
                .map_err(|e| CacheError::Serialization(e.to_string())),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness: StalenessPolicy::default(),
            entity_capacity: Self::default_entity_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(
            config.staleness,
            StalenessPolicy::MeanInterval { tolerance: 1.0 }
        );
        assert_eq!(config.entity_capacity, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = CacheConfig::default()
            .with_staleness(StalenessPolicy::Fixed { seconds: 900.0 })
            .with_entity_capacity(64);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"policy\": \"fixed\""));
        let deserialized = CacheConfig::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = CacheConfig::from_json("{}").unwrap();
        assert_eq!(config, CacheConfig::default());

        let config =
            CacheConfig::from_json(r#"{"staleness": {"policy": "mean_interval"}}"#).unwrap();
        assert_eq!(
            config.staleness,
            StalenessPolicy::MeanInterval { tolerance: 1.0 }
        );
    }

    #[test]
    fn test_config_validation() {
        let negative_window = r#"{"staleness": {"policy": "fixed", "seconds": -1.0}}"#;
        assert!(CacheConfig::from_json(negative_window).is_err());

        let negative_tolerance =
            r#"{"staleness": {"policy": "mean_interval", "tolerance": -0.5}}"#;
        assert!(CacheConfig::from_json(negative_tolerance).is_err());
        assert!(CacheConfig::from_json(r#"{"unknown": 1}"#).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"staleness": {{"policy": "unbounded"}}, "entity_capacity": 4}}"#
        )
        .unwrap();

        let config = CacheConfig::from_file(file.path()).unwrap();
        assert_eq!(config.staleness, StalenessPolicy::Unbounded);
        assert_eq!(config.entity_capacity, 4);
    }

    #[test]
    fn test_from_missing_file() {
        let err = CacheConfig::from_file("/nonexistent/ephemeris.json").unwrap_err();
        assert!(matches!(err, CacheError::Io(_)));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_roundtrip() {
        let config = CacheConfig::default()
            .with_staleness(StalenessPolicy::MeanInterval { tolerance: 2.0 });
        let toml_str = config.to_toml().unwrap();
        assert_eq!(CacheConfig::from_toml(&toml_str).unwrap(), config);
    }
}

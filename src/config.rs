//! Settings for an elastibee run
//!
//! Every key has a default, so a missing settings file and an empty one
//! behave the same. CLI flags are applied on top after loading.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Complete settings loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ecobee API access
    pub ecobee: EcobeeSettings,

    /// Elasticsearch destination
    pub elasticsearch: ElasticSettings,

    /// Archive loop
    pub archive: ArchiveSettings,
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::read_failed(path, e))?;
        Self::from_yaml(&yaml)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that cannot drive a run
    pub fn validate(&self) -> Result<()> {
        if self.archive.window_days == 0 {
            return Err(Error::invalid_value(
                "archive.window_days",
                "must be at least 1",
            ));
        }
        if self.elasticsearch.index.is_empty() {
            return Err(Error::invalid_value("elasticsearch.index", "must not be empty"));
        }
        if self.ecobee.api_base.is_empty() {
            return Err(Error::invalid_value("ecobee.api_base", "must not be empty"));
        }
        for (field, secs) in [
            ("ecobee.api_timeout_seconds", self.ecobee.api_timeout_seconds),
            ("ecobee.auth_timeout_seconds", self.ecobee.auth_timeout_seconds),
            ("elasticsearch.timeout_seconds", self.elasticsearch.timeout_seconds),
        ] {
            if secs == 0 {
                return Err(Error::invalid_value(field, "must be at least 1"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// ecobee
// ============================================================================

/// ecobee API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcobeeSettings {
    /// API base URL
    pub api_base: String,

    /// Credentials file holding the app key and tokens
    pub credentials: PathBuf,

    /// Timeout for data requests in seconds
    pub api_timeout_seconds: u64,

    /// Timeout for PIN and token requests in seconds
    pub auth_timeout_seconds: u64,
}

impl Default for EcobeeSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.ecobee.com".to_string(),
            credentials: PathBuf::from("app.json"),
            api_timeout_seconds: 90,
            auth_timeout_seconds: 30,
        }
    }
}

impl EcobeeSettings {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_seconds)
    }
}

// ============================================================================
// Elasticsearch
// ============================================================================

/// Elasticsearch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticSettings {
    /// Cluster URL
    pub host: String,

    /// Index receiving the records
    pub index: String,

    /// Index settings/mappings document used when the index is created
    pub mapping: PathBuf,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ElasticSettings {
    fn default() -> Self {
        Self {
            host: "http://estc:9200".to_string(),
            index: "eco".to_string(),
            mapping: PathBuf::from("etc/mapping.json"),
            timeout_seconds: 20,
        }
    }
}

impl ElasticSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// ============================================================================
// Archive
// ============================================================================

/// Archive loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Directory receiving one NDJSON file per window
    pub dir: PathBuf,

    /// Days per report request
    pub window_days: u32,

    /// Pause between windows in seconds
    pub pause_seconds: u64,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("archive"),
            window_days: 20,
            pause_seconds: 15,
        }
    }
}

impl ArchiveSettings {
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ecobee.api_base, "https://api.ecobee.com");
        assert_eq!(settings.ecobee.credentials, PathBuf::from("app.json"));
        assert_eq!(settings.ecobee.api_timeout(), Duration::from_secs(90));
        assert_eq!(settings.ecobee.auth_timeout(), Duration::from_secs(30));
        assert_eq!(settings.elasticsearch.host, "http://estc:9200");
        assert_eq!(settings.elasticsearch.index, "eco");
        assert_eq!(
            settings.elasticsearch.mapping,
            PathBuf::from("etc/mapping.json")
        );
        assert_eq!(settings.elasticsearch.timeout(), Duration::from_secs(20));
        assert_eq!(settings.archive.dir, PathBuf::from("archive"));
        assert_eq!(settings.archive.window_days, 20);
        assert_eq!(settings.archive.pause(), Duration::from_secs(15));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
elasticsearch:
  host: http://localhost:9200
archive:
  pause_seconds: 0
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.elasticsearch.host, "http://localhost:9200");
        assert_eq!(settings.elasticsearch.index, "eco");
        assert_eq!(settings.archive.pause_seconds, 0);
        assert_eq!(settings.archive.window_days, 20);
        assert_eq!(settings.ecobee, EcobeeSettings::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml("\n  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = Settings::from_yaml("archive:\n  window_days: 0\n").unwrap_err();
        assert!(err.to_string().contains("archive.window_days"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Settings::from_yaml("ecobee:\n  api_timeout_seconds: 0\n").unwrap_err();
        assert!(err.to_string().contains("ecobee.api_timeout_seconds"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Settings::from_yaml("archive: [not, a, map]").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("elastibee.yaml");
        std::fs::write(&path, "elasticsearch:\n  index: thermostat\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.elasticsearch.index, "thermostat");

        let err = Settings::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}

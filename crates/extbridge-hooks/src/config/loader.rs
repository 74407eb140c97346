//! Configuration loader

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{BridgeConfig, ConfigValidator};
use crate::error::{HooksError, Result};

/// Project-level configuration path, relative to the working directory
pub const PROJECT_CONFIG_PATH: &str = ".extbridge/bridge.yaml";

/// Loads [`BridgeConfig`] from YAML
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration
    ///
    /// Uses `explicit` when given, otherwise the project configuration,
    /// otherwise defaults. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read, is not valid
    /// YAML, or fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<BridgeConfig> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_PATH));
        let config = Self::load_from_path(&path)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<BridgeConfig> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(BridgeConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            HooksError::InvalidConfiguration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "Loaded configuration file");
        Self::parse_yaml(&content)
    }

    /// Parse YAML configuration content
    ///
    /// An empty document yields defaults. Unset fields take their defaults.
    pub fn parse_yaml(content: &str) -> Result<BridgeConfig> {
        if content.trim().is_empty() {
            return Ok(BridgeConfig::default());
        }

        serde_yaml::from_str(content)
            .map_err(|e| HooksError::InvalidConfiguration(format!("Invalid YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
extension: article-workflows
logging:
  filter: "extbridge_hooks=debug"
  json: true
dispatch:
  catch_panics: false
  drain_timeout_ms: 250
"#;

        let config = ConfigLoader::parse_yaml(yaml).unwrap();
        assert_eq!(config.extension, "article-workflows");
        assert_eq!(config.logging.filter, "extbridge_hooks=debug");
        assert!(config.logging.json);
        assert!(!config.dispatch.catch_panics);
        assert_eq!(config.dispatch.drain_timeout_ms, 250);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ConfigLoader::parse_yaml("extension: partial\n").unwrap();
        assert_eq!(config.extension, "partial");
        assert_eq!(config.logging, Default::default());
        assert_eq!(config.dispatch, Default::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ConfigLoader::parse_yaml("  \n").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ConfigLoader::parse_yaml("dispatch: [unclosed");
        assert!(matches!(result, Err(HooksError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from_path(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "extension: from-file").unwrap();
        writeln!(file, "dispatch:\n  drain_timeout_ms: 10").unwrap();

        let config = ConfigLoader::load(Some(file.path())).unwrap();
        assert_eq!(config.extension, "from-file");
        assert_eq!(config.dispatch.drain_timeout_ms, 10);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dispatch:\n  drain_timeout_ms: 0").unwrap();

        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }
}

//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; without one the default locations are
    /// searched and built-in defaults are kept if none is found.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI log level
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        if let Some(l) = level {
            self.config.log.level = l;
        }
        self
    }

    /// Override with CLI store directory; selects the file backend
    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.config.store.backend = "file".to_string();
            self.config.store.path = Some(p);
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.store.backend, "memory");
        assert!(!config.selfstate.enabled);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_log_level(Some("debug".to_string()))
            .with_store_path(Some(PathBuf::from("/srv/selfwatch")))
            .build();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.store.backend, "file");
        assert_eq!(config.store.path, Some(PathBuf::from("/srv/selfwatch")));
    }

    #[test]
    fn test_none_leaves_values() {
        let config = ConfigBuilder::new()
            .with_log_level(None)
            .with_store_path(None)
            .build();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.store.backend, "memory");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/selfwatch.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_then_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"warn\"\n[selfstate]\nenabled = true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .with_log_level(Some("error".to_string()))
            .build();

        assert_eq!(config.log.level, "error");
        assert!(config.selfstate.enabled);
    }
}

//! Runtime configuration file parsing.
//!
//! ```toml
//! [runtime]
//! print = "stderr"
//! max_heap_bytes = 1048576
//!
//! [packages]
//! sb = "System.Text.StringBuilder"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {file}: {message}")]
    Toml { file: String, message: String },
}

/// Where `print` output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintTarget {
    #[default]
    Stdout,
    Stderr,
    /// Routed through `tracing` at info level.
    Log,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSection {
    pub print: PrintTarget,
    pub max_heap_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub runtime: RuntimeSection,
    /// Global name → host type full name, registered as packages when the
    /// interpreter is built.
    pub packages: BTreeMap<String, String>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            file: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<RuntimeConfig>(&content).map_err(|e| ConfigError::Toml {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), packages = config.packages.len(), "loaded runtime config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            file: INLINE_SOURCE.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = RuntimeConfig::parse(
            r#"
            [runtime]
            print = "log"
            max_heap_bytes = 4096

            [packages]
            sb = "System.Text.StringBuilder"
            "#,
        )
        .unwrap();

        let mut packages = BTreeMap::new();
        packages.insert("sb".to_string(), "System.Text.StringBuilder".to_string());
        assert_eq!(
            config,
            RuntimeConfig {
                runtime: RuntimeSection {
                    print: PrintTarget::Log,
                    max_heap_bytes: Some(4096),
                },
                packages,
            }
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuntimeConfig::parse("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.runtime.print, PrintTarget::Stdout);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RuntimeConfig::parse("[runtime]\nprnt = \"stdout\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { ref file, .. } if file == INLINE_SOURCE));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runtime]\nprint = \"stderr\"").unwrap();
        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.runtime.print, PrintTarget::Stderr);
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::load(Path::new("/nonexistent/lune.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

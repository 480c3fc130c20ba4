//! Global configuration model for berth.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{BerthError, Result};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BerthConfig {
    /// Base directory for berth state.
    pub data_dir: PathBuf,
    /// Path to the persisted container table.
    pub registry_file: PathBuf,
    /// Container runtime executable.
    pub runtime_binary: String,
    /// DNS server handed to launched containers via `--dns=`.
    pub dns: Option<String>,
    /// Seconds a container gets to stop before it is removed.
    pub stop_grace_secs: u32,
    /// Executables answering dispatcher families (`env`, `px`, `dns`).
    pub hooks: BTreeMap<String, PathBuf>,
    /// Extra runtime flags placed before the image on every launch.
    pub run_flags: Vec<String>,
}

impl Default for BerthConfig {
    fn default() -> Self {
        let data_dir = constants::data_dir().clone();
        Self {
            registry_file: data_dir.join(constants::REGISTRY_FILE_NAME),
            data_dir,
            runtime_binary: constants::DEFAULT_RUNTIME_BINARY.to_string(),
            dns: None,
            stop_grace_secs: constants::DEFAULT_STOP_GRACE_SECS,
            hooks: BTreeMap::new(),
            run_flags: Vec::new(),
        }
    }
}

impl BerthConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, does not
    /// parse, or holds invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| BerthError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.runtime_binary.trim().is_empty() {
            return Err(BerthError::Config {
                message: "runtime_binary must not be empty".into(),
            });
        }
        if self.stop_grace_secs > constants::MAX_STOP_GRACE_SECS {
            return Err(BerthError::Config {
                message: format!(
                    "stop_grace_secs {} exceeds {}",
                    self.stop_grace_secs,
                    constants::MAX_STOP_GRACE_SECS
                ),
            });
        }
        Ok(())
    }

    /// Returns the hook executable for a dispatcher family, if configured.
    #[must_use]
    pub fn hook(&self, family: &str) -> Option<&Path> {
        self.hooks.get(family).map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BerthConfig::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config.runtime_binary, "docker");
        assert_eq!(config.stop_grace_secs, 5);
        assert!(config.dns.is_none());
        assert!(config.run_flags.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "dns": "1.2.3.4", "hooks": { "px": "/usr/local/bin/px-hook" } }"#,
        )
        .expect("write");

        let config = BerthConfig::load(&path).expect("load");
        assert_eq!(config.dns.as_deref(), Some("1.2.3.4"));
        assert_eq!(config.hook("px"), Some(Path::new("/usr/local/bin/px-hook")));
        assert_eq!(config.hook("dns"), None);
        assert_eq!(config.runtime_binary, "docker");
    }

    #[test]
    fn empty_runtime_binary_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "runtime_binary": " " }"#).expect("write");

        let err = BerthConfig::load(&path).unwrap_err();
        assert!(matches!(err, BerthError::Config { .. }));
    }

    #[test]
    fn run_flags_are_read_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "run_flags": ["--memory", "512m"] }"#).expect("write");

        let config = BerthConfig::load(&path).expect("load");
        assert_eq!(config.run_flags, vec!["--memory", "512m"]);
    }

    #[test]
    fn oversized_grace_is_rejected() {
        let config = BerthConfig {
            stop_grace_secs: 10_000,
            ..BerthConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Resolver configuration
//!
//! Values come from, in order of precedence: `PINSET_*` environment
//! variables, a JSON config file, and built-in defaults.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provider::{Policy, UpgradeStrategy};
use crate::{Error, Result};

/// Default ceiling on resolver rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolverConfig {
    /// Rounds attempted before the resolver gives up
    pub max_rounds: usize,
    pub upgrade_strategy: UpgradeStrategy,
    /// Resolve only the requested packages, skipping their dependencies
    pub ignore_dependencies: bool,
    pub allow_prereleases: bool,
    pub prefer_lowest: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            upgrade_strategy: UpgradeStrategy::default(),
            ignore_dependencies: false,
            allow_prereleases: false,
            prefer_lowest: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a JSON file; a missing file yields the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Build the effective configuration from a config file and the environment.
    pub fn build<P: AsRef<Path>>(path: Option<P>, loader: &ConfigLoader) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(loader)?;
        log::debug!("Resolver configuration: {:?}", config);
        Ok(config)
    }

    /// Override values with those set in the environment.
    pub fn apply_env(&mut self, loader: &ConfigLoader) -> Result<()> {
        if let Some(value) = loader.get_env_config("max-rounds") {
            self.max_rounds = value.parse().map_err(|_| {
                Error::Config(format!("PINSET_MAX_ROUNDS must be a positive integer, got \"{}\"", value))
            })?;
        }
        if let Some(value) = loader.get_env_config("upgrade-strategy") {
            self.upgrade_strategy = value.parse()?;
        }
        if let Some(value) = loader.get_env_bool("allow-prereleases") {
            self.allow_prereleases = value;
        }
        Ok(())
    }

    /// The candidate ranking policy these settings describe.
    pub fn policy(&self) -> Policy {
        Policy::new()
            .prefer_lowest(self.prefer_lowest)
            .allow_prereleases(self.allow_prereleases)
    }
}

/// Reads `PINSET_*` settings from the process environment.
///
/// Values set with [`ConfigLoader::with_var`] take precedence over the real
/// environment and are read even when environment lookup is disabled.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    use_environment: bool,
    overrides: HashMap<String, String>,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self {
            use_environment,
            overrides: HashMap::new(),
        }
    }

    pub fn with_var(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(var.into(), value.into());
        self
    }

    /// Get a PINSET_* variable
    pub fn get_pinset_env(&self, var: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(var) {
            return Some(value.clone()).filter(|s| !s.is_empty());
        }
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get a configuration value from the environment.
    /// Converts "foo-bar" to "PINSET_FOO_BAR"
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        let env_var = format!("PINSET_{}", key.replace('-', "_").to_uppercase());
        self.get_pinset_env(&env_var)
    }

    pub fn get_env_bool(&self, key: &str) -> Option<bool> {
        self.get_env_config(key)
            .map(|val| !matches!(val.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_rounds, 200_000);
        assert_eq!(config.upgrade_strategy, UpgradeStrategy::OnlyIfNeeded);
        assert!(!config.ignore_dependencies);
        assert!(!config.allow_prereleases);
        assert!(!config.prefer_lowest);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ResolverConfig::from_json(
            r#"{"max-rounds": 50, "upgrade-strategy": "eager", "prefer-lowest": true}"#,
        )
        .unwrap();
        assert_eq!(config.max_rounds, 50);
        assert_eq!(config.upgrade_strategy, UpgradeStrategy::Eager);
        assert!(config.prefer_lowest);
        assert!(!config.allow_prereleases);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            ResolverConfig::from_json(r#"{"upgrade-strategy": "never"}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let loader = ConfigLoader::new(false)
            .with_var("PINSET_MAX_ROUNDS", "10")
            .with_var("PINSET_UPGRADE_STRATEGY", "to-satisfy-only")
            .with_var("PINSET_ALLOW_PRERELEASES", "1");
        let mut config = ResolverConfig::default();
        config.apply_env(&loader).unwrap();

        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.upgrade_strategy, UpgradeStrategy::ToSatisfyOnly);
        assert!(config.allow_prereleases);
    }

    #[test]
    fn test_env_invalid_value() {
        let loader = ConfigLoader::new(false).with_var("PINSET_MAX_ROUNDS", "lots");
        let mut config = ResolverConfig::default();
        assert!(matches!(config.apply_env(&loader), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_bool() {
        let loader = ConfigLoader::new(false)
            .with_var("PINSET_A", "false")
            .with_var("PINSET_B", "yes")
            .with_var("PINSET_C", "");
        assert_eq!(loader.get_env_bool("a"), Some(false));
        assert_eq!(loader.get_env_bool("b"), Some(true));
        assert_eq!(loader.get_env_bool("c"), None);
        assert_eq!(loader.get_env_bool("d"), None);
    }

    #[test]
    fn test_policy() {
        let config = ResolverConfig {
            prefer_lowest: true,
            ..Default::default()
        };
        assert!(config.policy().prefer_lowest);
        assert!(!config.policy().allow_prereleases);
    }
}

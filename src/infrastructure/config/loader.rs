use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    #[error("Invalid runner timeout: {0}s. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Runner binary cannot be empty")]
    EmptyRunnerBinary,

    #[error("Runner task cannot be empty: {0}")]
    EmptyTask(&'static str),

    #[error("Invalid literal_name: {0:?}. Must be an identifier")]
    InvalidLiteralName(String),

    #[error("Source extension cannot be empty")]
    EmptyExtension,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Scope rule {index} is invalid: {reason}")]
    InvalidScopeRule { index: usize, reason: String },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .budget-sync/config.yaml (project config)
    /// 3. .budget-sync/local.yaml (local overrides, optional)
    /// 4. Environment variables (BUDGET_SYNC_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".budget-sync/config.yaml"))
            .merge(Yaml::file(".budget-sync/local.yaml"))
            .merge(Env::prefixed("BUDGET_SYNC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("BUDGET_SYNC_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(config.max_iterations));
        }

        if config.runner.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.runner.timeout_secs));
        }

        if config.runner.binary.trim().is_empty() {
            return Err(ConfigError::EmptyRunnerBinary);
        }

        if config.runner.full_suite_task.trim().is_empty() {
            return Err(ConfigError::EmptyTask("runner.full_suite_task"));
        }

        if config.scopes.default_task.trim().is_empty() {
            return Err(ConfigError::EmptyTask("scopes.default_task"));
        }

        if !is_identifier(&config.literal_name) {
            return Err(ConfigError::InvalidLiteralName(config.literal_name.clone()));
        }

        if config.source_extension.trim().is_empty() {
            return Err(ConfigError::EmptyExtension);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        for (index, rule) in config.scopes.rules.iter().enumerate() {
            if rule.task.trim().is_empty() {
                return Err(ConfigError::InvalidScopeRule {
                    index,
                    reason: "task cannot be empty".to_string(),
                });
            }
            if rule.contains.is_empty() && rule.prefixes.is_empty() {
                return Err(ConfigError::InvalidScopeRule {
                    index,
                    reason: "needs at least one `contains` or `prefixes` pattern".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::ScopeRule;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.literal_name, "ExUnits");
        assert_eq!(config.runner.binary, "sbtn");
        assert_eq!(config.runner.full_suite_task, "quick");
        assert_eq!(config.runner.timeout_secs, 600);
        assert_eq!(config.test_dirs.len(), 7);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
project_root: /work/scalus
max_iterations: 10
literal_name: Budget
test_dirs:
  - core/src/test/scala
runner:
  binary: sbt
  timeout_secs: 120
scopes:
  default_task: core/testOnly
  rules:
    - task: bench/testOnly
      contains: [bench]
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.project_root, PathBuf::from("/work/scalus"));
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.literal_name, "Budget");
        assert_eq!(config.test_dirs, vec![PathBuf::from("core/src/test/scala")]);
        assert_eq!(config.runner.binary, "sbt");
        assert_eq!(config.runner.full_suite_task, "quick");
        assert_eq!(config.runner.timeout_secs, 120);
        assert_eq!(config.scopes.rules[0].prefixes, Vec::<String>::new());
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.rotation, "daily");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_iterations() {
        let config = Config {
            max_iterations: 0,
            ..Default::default()
        };

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxIterations(0))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.runner.timeout_secs = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }

    #[test]
    fn test_validate_literal_name() {
        for bad in ["", "Ex Units", "1Units", "Ex(Units"] {
            let config = Config {
                literal_name: bad.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(
                    ConfigLoader::validate(&config),
                    Err(ConfigError::InvalidLiteralName(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_scope_rule_without_patterns() {
        let mut config = Config::default();
        config.scopes.rules.push(ScopeRule {
            task: "x/testOnly".to_string(),
            contains: vec![],
            prefixes: vec![],
        });

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidScopeRule { index: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations: 5\nrunner:\n  full_suite_task: test").unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();

        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.runner.full_suite_task, "test");
        assert_eq!(config.runner.binary, "sbtn");
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations: 0").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for budget-sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Root that test directories and reported paths are relative to
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Maximum fix iterations per loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Constructor name of the resource-cost literal, e.g. `ExUnits`
    #[serde(default = "default_literal_name")]
    pub literal_name: String,

    /// Extension of test source files (without the dot)
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Test source roots, relative to `project_root`
    #[serde(default = "default_test_dirs")]
    pub test_dirs: Vec<PathBuf>,

    /// External test runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Rerun scope routing
    #[serde(default)]
    pub scopes: ScopesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

const fn default_max_iterations() -> u32 {
    25
}

fn default_literal_name() -> String {
    "ExUnits".to_string()
}

fn default_source_extension() -> String {
    "scala".to_string()
}

fn default_test_dirs() -> Vec<PathBuf> {
    [
        "scalus-core/shared/src/test/scala",
        "scalus-core/jvm/src/test/scala",
        "scalus-examples/shared/src/test/scala",
        "scalus-examples/jvm/src/test/scala",
        "scalus-testkit/shared/src/test/scala",
        "scalus-testkit/jvm/src/test/scala",
        "scalus-design-patterns/src/test/scala",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            max_iterations: default_max_iterations(),
            literal_name: default_literal_name(),
            source_extension: default_source_extension(),
            test_dirs: default_test_dirs(),
            runner: RunnerConfig::default(),
            scopes: ScopesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// External test runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Runner executable
    #[serde(default = "default_runner_binary")]
    pub binary: String,

    /// Task that runs the whole suite
    #[serde(default = "default_full_suite_task")]
    pub full_suite_task: String,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_runner_binary() -> String {
    "sbtn".to_string()
}

fn default_full_suite_task() -> String {
    "quick".to_string()
}

const fn default_timeout_secs() -> u64 {
    600
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary: default_runner_binary(),
            full_suite_task: default_full_suite_task(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Routing of failing test identifiers to scoped rerun tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScopesConfig {
    /// Task for identifiers no rule claims
    #[serde(default = "default_scope_task")]
    pub default_task: String,

    /// Rules checked in order; first match wins
    #[serde(default = "default_scope_rules")]
    pub rules: Vec<ScopeRule>,
}

/// A rerun scope selected by substring or prefix match on the identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScopeRule {
    /// Task that runs the listed identifiers, e.g. `scalusExamplesJVM/testOnly`
    pub task: String,

    /// Identifier substrings that select this scope
    #[serde(default)]
    pub contains: Vec<String>,

    /// Identifier prefixes that select this scope
    #[serde(default)]
    pub prefixes: Vec<String>,
}

fn default_scope_task() -> String {
    "scalusJVM/testOnly".to_string()
}

fn default_scope_rules() -> Vec<ScopeRule> {
    vec![ScopeRule {
        task: "scalusExamplesJVM/testOnly".to_string(),
        contains: vec!["benchmarks".to_string()],
        prefixes: vec!["scalus.examples".to_string()],
    }]
}

impl Default for ScopesConfig {
    fn default() -> Self {
        Self {
            default_task: default_scope_task(),
            rules: default_scope_rules(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

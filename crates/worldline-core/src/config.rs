//! Configuration loading and typed config structures for the lab.
//!
//! The configuration lives in `worldline-config.yaml`. Every field has a
//! default, so an empty document is a valid configuration. After parsing,
//! [`LabConfig::validate`] checks the values that the engine cannot work
//! around (a zero level step, an all-zero weight table, a malformed target).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use worldline_agents::{AgentSelector, ContextWeights, SelectorError};
use worldline_ledger::{DEFAULT_LEVEL_STEP, LevelCurve, LevelError};
use worldline_tracker::{DEFAULT_HABIT_XP, DEFAULT_XP_PER_MINUTE, TaskRewards};

use crate::worldline::{Worldline, WorldlineError};

/// Environment variable overriding `storage.data_dir`.
pub const DATA_DIR_ENV: &str = "WORLDLINE_DATA_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The level step is invalid.
    #[error("invalid progression.level_step: {0}")]
    Level(#[from] LevelError),

    /// An agent weight table is invalid.
    #[error("invalid dialogue weights: {0}")]
    Weights(#[from] SelectorError),

    /// The target worldline is malformed.
    #[error("invalid progression.target_worldline: {0}")]
    Target(#[from] WorldlineError),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level lab configuration.
///
/// Mirrors the structure of `worldline-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabConfig {
    /// Level curve and divergence policy.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// XP values for tracker actions.
    #[serde(default)]
    pub rewards: RewardsConfig,

    /// Narrator selection.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Where records are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LabConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `WORLDLINE_DATA_DIR` overrides `storage.data_dir` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Check every value the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.progression.level_curve()?;
        self.progression.target()?;
        self.dialogue.selector()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Level curve and divergence policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// Advancing from level N to N+1 costs `N * level_step` XP.
    #[serde(default = "default_level_step")]
    pub level_step: u64,

    /// Divergence change when XP goes up.
    #[serde(default = "default_success_shift")]
    pub success_shift: i64,

    /// Divergence change when XP goes down.
    #[serde(default = "default_failure_shift")]
    pub failure_shift: i64,

    /// Reading that proximity is measured against.
    #[serde(default = "default_target_worldline")]
    pub target_worldline: String,
}

impl ProgressionConfig {
    /// The configured level curve.
    pub fn level_curve(&self) -> Result<LevelCurve, LevelError> {
        LevelCurve::new(self.level_step)
    }

    /// The configured target reading.
    pub fn target(&self) -> Result<Worldline, WorldlineError> {
        self.target_worldline.parse()
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            level_step: default_level_step(),
            success_shift: default_success_shift(),
            failure_shift: default_failure_shift(),
            target_worldline: default_target_worldline(),
        }
    }
}

/// XP values for tracker actions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewardsConfig {
    /// XP per task priority.
    #[serde(default)]
    pub task_xp: TaskRewards,

    /// XP per studied minute.
    #[serde(default = "default_study_xp_per_minute")]
    pub study_xp_per_minute: u32,

    /// XP of a new habit when none is given.
    #[serde(default = "default_habit_xp")]
    pub default_habit_xp: u32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            task_xp: TaskRewards::default(),
            study_xp_per_minute: default_study_xp_per_minute(),
            default_habit_xp: default_habit_xp(),
        }
    }
}

/// Narrator selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DialogueConfig {
    /// Fixed RNG seed for reproducible sessions. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Persona weights per narrative context.
    #[serde(default)]
    pub weights: ContextWeights,
}

impl DialogueConfig {
    /// A selector over the configured weights.
    pub fn selector(&self) -> Result<AgentSelector, SelectorError> {
        AgentSelector::new(self.weights.clone())
    }
}

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per record.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Override the data directory with `WORLDLINE_DATA_DIR` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(val);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_level_step() -> u64 {
    DEFAULT_LEVEL_STEP
}

const fn default_success_shift() -> i64 {
    1
}

const fn default_failure_shift() -> i64 {
    -1
}

fn default_target_worldline() -> String {
    "1.048596".to_owned()
}

const fn default_study_xp_per_minute() -> u32 {
    DEFAULT_XP_PER_MINUTE
}

const fn default_habit_xp() -> u32 {
    DEFAULT_HABIT_XP
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("worldline-data")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use worldline_agents::AgentWeights;
    use worldline_types::TaskPriority;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progression.level_step, 100);
        assert_eq!(config.progression.success_shift, 1);
        assert_eq!(config.progression.failure_shift, -1);
        assert_eq!(config.rewards.study_xp_per_minute, 2);
        assert_eq!(config.rewards.task_xp.xp_for(TaskPriority::High), 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
progression:
  level_step: 250
  success_shift: 3
  failure_shift: -2
  target_worldline: "1.130205"

rewards:
  task_xp:
    high: 80
    medium: 40
    low: 10
  study_xp_per_minute: 3
  default_habit_xp: 15

dialogue:
  seed: 2010
  weights:
    failure:
      okabe: 0
      kurisu: 1
      daru: 0
      mayuri: 0

storage:
  data_dir: "/tmp/lab"

logging:
  level: "debug"
  json: true
"#;

        let config = LabConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.progression.level_step, 250);
        assert_eq!(config.progression.failure_shift, -2);
        assert_eq!(config.rewards.task_xp.high, 80);
        assert_eq!(config.rewards.default_habit_xp, 15);
        assert_eq!(config.dialogue.seed, Some(2010));
        assert_eq!(config.dialogue.weights.failure, AgentWeights::new(0, 1, 0, 0));
        // Unlisted contexts keep their defaults.
        assert_eq!(
            config.dialogue.weights.greeting,
            ContextWeights::default().greeting
        );
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = LabConfig::parse("progression:\n  level_step: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.progression.level_step, 7);
        assert_eq!(config.rewards.study_xp_per_minute, 2);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(LabConfig::parse("").is_ok());
    }

    #[test]
    fn zero_level_step_is_invalid() {
        let config = LabConfig::parse("progression:\n  level_step: 0\n");
        let config = config.ok().unwrap_or_default();
        assert!(matches!(config.validate(), Err(ConfigError::Level(_))));
    }

    #[test]
    fn malformed_target_is_invalid() {
        let mut config = LabConfig::default();
        config.progression.target_worldline = "1.05".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::Target(_))));
    }

    #[test]
    fn all_zero_weights_are_invalid() {
        let mut config = LabConfig::default();
        config.dialogue.weights.success = AgentWeights::new(0, 0, 0, 0);
        assert!(matches!(config.validate(), Err(ConfigError::Weights(_))));
    }

    #[test]
    fn data_dir_override() {
        let mut storage = StorageConfig::default();
        storage.apply_overrides_from(|_| Some("/var/lib/lab".to_owned()));
        assert_eq!(storage.data_dir, PathBuf::from("/var/lib/lab"));

        let mut untouched = StorageConfig::default();
        untouched.apply_overrides_from(|_| Some("  ".to_owned()));
        assert_eq!(untouched.data_dir, PathBuf::from("worldline-data"));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("worldline-config.yaml");
        if path.exists() {
            let config = LabConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.is_ok_and(|c| c.validate().is_ok()));
        }
    }
}

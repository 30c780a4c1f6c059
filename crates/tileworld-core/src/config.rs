//! Configuration loading and typed config structures.
//!
//! The optional `tileworld-config.yaml` tunes the runtime around the startup
//! description. The startup description itself still decides the grid, the
//! executor tick interval, and the total run length; this file covers
//! everything else. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `simulation.seed`.
pub const SEED_ENV_VAR: &str = "TILEWORLD_SEED";

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

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `tileworld-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Run-wide settings.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Operation executor tuning.
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Agent actor tuning.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Grid rendering.
    #[serde(default)]
    pub render: RenderConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// `TILEWORLD_SEED` overrides `simulation.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), minus the I/O case.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `TILEWORLD_SEED` is set but is
    /// not an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let raw = std::env::var(SEED_ENV_VAR).ok();
        self.apply_seed_override(raw.as_deref())
    }

    fn apply_seed_override(&mut self, raw: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = raw else {
            return Ok(());
        };
        let seed = raw.trim().parse::<u64>().map_err(|_err| ConfigError::Invalid {
            reason: format!("{SEED_ENV_VAR} must be an unsigned integer, got {raw:?}"),
        })?;
        self.simulation.seed = Some(seed);
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.ops_per_tick == 0 {
            return Err(invalid("executor.ops_per_tick must be at least 1"));
        }
        if self.agents.action_interval_ms == 0 {
            return Err(invalid("agents.action_interval_ms must be at least 1"));
        }
        if self.agents.request_chance_percent > 100 {
            return Err(invalid("agents.request_chance_percent must be between 0 and 100"));
        }
        if self.render.every_n_ticks == 0 {
            return Err(invalid("render.every_n_ticks must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Run-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Seed for every agent's decision policy. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Operation executor tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutorConfig {
    /// Operations applied per tick.
    #[serde(default = "default_ops_per_tick")]
    pub ops_per_tick: usize,

    /// Queue bound. 0 means unbounded.
    #[serde(default)]
    pub max_pending: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            ops_per_tick: default_ops_per_tick(),
            max_pending: 0,
        }
    }
}

/// Agent actor tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    /// Pause between actor loop iterations.
    #[serde(default = "default_action_interval_ms")]
    pub action_interval_ms: u64,

    /// Points offered in reply to a task request.
    #[serde(default = "default_offer_points")]
    pub offer_points: u64,

    /// Chance per iteration of sending a task request to a peer.
    #[serde(default)]
    pub request_chance_percent: u8,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            action_interval_ms: default_action_interval_ms(),
            offer_points: default_offer_points(),
            request_chance_percent: 0,
        }
    }
}

/// Grid rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Print the grid at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Print every n-th tick.
    #[serde(default = "default_every_n_ticks")]
    pub every_n_ticks: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            every_n_ticks: default_every_n_ticks(),
        }
    }
}

const fn default_ops_per_tick() -> usize {
    1
}

const fn default_action_interval_ms() -> u64 {
    500
}

const fn default_offer_points() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

const fn default_every_n_ticks() -> u64 {
    1
}

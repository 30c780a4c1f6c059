//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error so `run` can propagate
/// everything with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tileworld_core::ConfigError,
    },

    /// The startup description could not be read or parsed.
    #[error("startup file error: {source}")]
    Scenario {
        /// The underlying parse error.
        #[from]
        source: tileworld_world::ScenarioError,
    },

    /// The startup description describes an impossible world.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: tileworld_world::WorldError,
    },

    /// Bootstrapping or running the simulation failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: tileworld_core::RunnerError,
    },
}

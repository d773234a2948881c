//! Simulation configuration and its validation.
//!
//! A config is built up programmatically (no file/JSON loading — that's
//! host-side concern) and checked once, at `Simulation::new` time, so a
//! malformed run fails fast instead of producing nonsense statistics.

use thiserror::Error;

/// One source's construction parameters.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub id: String,
    pub priority: i32,
    pub lambda: f64,
}

/// One server's construction parameters.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub id: String,
    pub min_time: f64,
    pub max_time: f64,
}

/// Full simulation configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub sources: Vec<SourceConfig>,
    pub servers: Vec<ServerConfig>,
    pub buffer_capacity: usize,
    pub simulation_time: f64,
    pub seed: u64,
}

/// Everything that can make a `SimulationConfig` unusable.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("simulation_time must be positive, got {0}")]
    NonPositiveSimulationTime(f64),
    #[error("no sources configured")]
    NoSources,
    #[error("no servers configured")]
    NoServers,
    #[error("source `{id}` has non-positive lambda ({lambda})")]
    NonPositiveLambda { id: String, lambda: f64 },
    #[error("duplicate source id `{0}`")]
    DuplicateSourceId(String),
    #[error("server `{id}` has min_time ({min_time}) greater than max_time ({max_time})")]
    InvertedServerBounds { id: String, min_time: f64, max_time: f64 },
    #[error("server `{id}` has a negative min_time ({min_time})")]
    NegativeServerTime { id: String, min_time: f64 },
    #[error("duplicate server id `{0}`")]
    DuplicateServerId(String),
}

impl SimulationConfig {
    /// Check every invariant a `Simulation` depends on. Called once, at
    /// construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation_time <= 0.0 {
            return Err(ConfigError::NonPositiveSimulationTime(self.simulation_time));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.servers.is_empty() {
            return Err(ConfigError::NoServers);
        }

        let mut seen_sources = std::collections::HashSet::new();
        for source in &self.sources {
            if source.lambda <= 0.0 {
                return Err(ConfigError::NonPositiveLambda {
                    id: source.id.clone(),
                    lambda: source.lambda,
                });
            }
            if !seen_sources.insert(&source.id) {
                return Err(ConfigError::DuplicateSourceId(source.id.clone()));
            }
        }

        let mut seen_servers = std::collections::HashSet::new();
        for server in &self.servers {
            if server.min_time < 0.0 {
                return Err(ConfigError::NegativeServerTime {
                    id: server.id.clone(),
                    min_time: server.min_time,
                });
            }
            if server.min_time > server.max_time {
                return Err(ConfigError::InvertedServerBounds {
                    id: server.id.clone(),
                    min_time: server.min_time,
                    max_time: server.max_time,
                });
            }
            if !seen_servers.insert(&server.id) {
                return Err(ConfigError::DuplicateServerId(server.id.clone()));
            }
        }

        Ok(())
    }
}

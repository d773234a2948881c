//! Discrete-event simulator of a transaction-verification queueing
//! network: Poisson arrival streams feed a bounded admission buffer and a
//! pool of processing servers, egress is packetized by source priority,
//! and a sequential-sampling controller auto-extends a run until the
//! rejection-rate estimate has converged.
//!
//! # Layout
//!
//! - [`rng`]: the xorshift64* generator and its variate families.
//! - [`models`]: `Transaction`, `Source`, `Server`, `Buffer`.
//! - [`events`]: the event calendar.
//! - [`dispatch`]: the admission (D_in) and egress (D_out) dispatchers.
//! - [`stats`]: the observational log and derived statistics.
//! - [`config`]: `SimulationConfig` and its validation.
//! - [`kernel`]: `Simulation`, the owner of a single run.

pub mod config;
pub mod dispatch;
pub mod events;
pub mod kernel;
pub mod models;
pub mod rng;
pub mod stats;

pub use config::{ConfigError, ServerConfig, SimulationConfig, SourceConfig};
pub use kernel::{Simulation, SimulationState};
pub use models::{Buffer, Server, Source, Transaction};
pub use stats::{Observation, ServerStatistics, SourceStatistics, Statistics};

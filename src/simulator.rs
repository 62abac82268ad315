//! Simulation driver for the action-selection circuit.
//!
//! This module provides three components:
//! - `config`: the immutable, validated configuration of a run;
//! - `simulator`: the fixed-step run of the circuit and its recorded output;
//! - `sweep`: batches of independent runs, e.g., to locate the attenuation that flips the winner.
//!
//! # Example
//! ```rust
//! use rusty_bg::core::channel::Channel;
//! use rusty_bg::simulator::config::SimulationConfig;
//! use rusty_bg::simulator::simulator::Simulator;
//!
//! // Attenuate the stronger channel by 80% during [1, 2)
//! let config = SimulationConfig {
//!     a1: 1.0,
//!     a2: 0.5,
//!     kappa: 0.8,
//!     fus_start: 1.0,
//!     fus_dur: 1.0,
//!     run_duration: 3.0,
//!     ..Default::default()
//! };
//!
//! let mut simulator = Simulator::build(config).unwrap();
//! let record = simulator.run().unwrap();
//!
//! let phases = record.phase_winners(0.25).unwrap();
//! assert_eq!(phases.before, Some(Channel::One));
//! assert_eq!(phases.during, Some(Channel::Two));
//! assert_eq!(phases.after, Some(Channel::One));
//! ```

pub mod config;
pub mod simulator;
pub mod sweep;

/// Time (in seconds) the circuit needs to settle after an input change before a winner is read.
pub const SETTLING_TIME: f64 = 0.25;
/// The minimum number of runs for a sweep to use the thread pool.
pub const MIN_PARALLEL_RUNS: usize = 4;
/// The maximum number of time steps of a single run.
pub const MAX_STEPS: usize = 10_000_000;

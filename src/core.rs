//! Core module defining the main components of the Rusty BG library.
//!
//! This module provides the building blocks of the action-selection circuit:
//!
//! - [`signal`]: time functions driving the circuit (cortical drives, FUS windows, GPi scale)
//! - [`population`] and [`synapse`]: leaky-integrator rate populations and low-pass synapses
//! - [`basal_ganglia`] and [`thalamus`]: the two stages of the selection loop
//! - [`circuit`]: the wiring Cortex → Striatum → GPi → Thalamus for both channels
//! - [`probe`] and [`metrics`]: recorded time series and their analysis
//!
//! # Examples
//!
//! ```
//! use nalgebra::Vector2;
//! use rusty_bg::core::circuit::{Circuit, CircuitParams};
//! use rusty_bg::core::TIME_STEP;
//!
//! let mut circuit = Circuit::build(&CircuitParams::default(), TIME_STEP).unwrap();
//! let mut outputs = circuit.step(&Vector2::new(1.0, 0.5), 1.0);
//! for _ in 0..999 {
//!     outputs = circuit.step(&Vector2::new(1.0, 0.5), 1.0);
//! }
//!
//! // The channel with the stronger drive is released from GPi inhibition
//! assert!(outputs.thalamus[0] > outputs.thalamus[1]);
//! ```
pub mod basal_ganglia;
pub mod channel;
pub mod circuit;
pub mod metrics;
pub mod population;
pub mod probe;
pub mod signal;
pub mod synapse;
pub mod thalamus;
pub mod utils;

/// The number of competing action channels.
pub const NUM_CHANNELS: usize = 2;
/// The default integration time step (in seconds).
pub const TIME_STEP: f64 = 1e-3;

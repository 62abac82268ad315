//! This crate simulates action selection in the basal ganglia (BG) and its modulation by focused ultrasound (FUS).
//!
//! Two cortical channels compete through a Cortex → Striatum → GPi → Thalamus loop.
//! The channel with the stronger drive silences its own GPi output and is released at the thalamus,
//! while the diffuse subthalamic excitation keeps the GPi of the other channel active.
//! A FUS pulse either attenuates the drive of one channel over a time window, or suppresses the GPi output.
//!
//! # Running a Simulation
//!
//! ```rust
//! use rusty_bg::core::channel::Channel;
//! use rusty_bg::simulator::config::SimulationConfig;
//! use rusty_bg::simulator::simulator::run_simulation;
//!
//! // Channel 1 is driven twice as strongly, but loses 80% of its drive during [1, 2)
//! let config = SimulationConfig {
//!     a1: 1.0,
//!     a2: 0.5,
//!     kappa: 0.8,
//!     fus_start: 1.0,
//!     fus_dur: 1.0,
//!     run_duration: 3.0,
//!     ..Default::default()
//! };
//! let record = run_simulation(&config).unwrap();
//!
//! // The selection goes to channel 2 during the pulse and back to channel 1 afterwards
//! assert_eq!(record.switches().len(), 2);
//! assert_eq!(record.winner_at_end(), Some(Channel::One));
//! ```
//!
//! # Suppressing the GPi
//!
//! ```rust
//! use rusty_bg::simulator::config::SimulationConfig;
//! use rusty_bg::simulator::simulator::run_simulation;
//!
//! // Without GPi output, the thalamus is released on both channels
//! let config = SimulationConfig {
//!     gpi_scale_base: 0.0,
//!     ..Default::default()
//! };
//! let record = run_simulation(&config).unwrap();
//! let (_, thalamus) = record.thalamus.last().unwrap();
//! assert_eq!(thalamus[0], thalamus[1]);
//! ```

pub mod core;
pub mod error;
pub mod simulator;

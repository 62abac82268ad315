//! This module contains the simulator and the record of a run.
use derivative::Derivative;
use log;
use nalgebra::Vector2;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::config::SimulationConfig;
use crate::core::channel::Channel;
use crate::core::circuit::Circuit;
use crate::core::metrics::{self, Switch};
use crate::core::probe::{Probe, TimeSeries};
use crate::core::signal::{CorticalInput, GpiScale, Signal};
use crate::core::utils::TimeInterval;
use crate::error::BGError;

/// The lifecycle of a simulator: each simulator runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
}

/// A single run of the circuit under a fixed configuration.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    circuit: Circuit,
    cortical_input: CorticalInput,
    gpi_scale: GpiScale,
    state: RunState,
    // None when the run is noiseless; no random number is then drawn.
    noise: Option<Normal<f64>>,
    #[derivative(Debug = "ignore")]
    rng: ChaCha8Rng,
}

impl Simulator {
    /// Create a simulator for the given configuration, with the circuit at rest.
    /// The function returns an error if the configuration is invalid.
    pub fn build(config: SimulationConfig) -> Result<Self, BGError> {
        config.validate()?;

        let noise = match config.noise_std > 0.0 {
            true => Some(
                Normal::new(0.0, config.noise_std)
                    .map_err(|e| BGError::InvalidParameter(e.to_string()))?,
            ),
            false => None,
        };

        Ok(Simulator {
            circuit: Circuit::build(&config.circuit, config.dt)?,
            cortical_input: config.cortical_input()?,
            gpi_scale: config.gpi_scale()?,
            state: RunState::Idle,
            noise,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Integrate the circuit over the whole run and return the recorded outputs.
    /// Samples are taken after each step, at t = dt, 2 dt, ..., run_duration.
    /// The function returns an error if the simulator already ran or if the circuit diverges.
    pub fn run(&mut self) -> Result<SimulationRecord, BGError> {
        if self.state != RunState::Idle {
            return Err(BGError::InvalidOperation(
                "a simulator runs only once, build a new one for another run".to_string(),
            ));
        }
        self.state = RunState::Running;

        let dt = self.config.dt;
        let num_steps = self.config.num_steps();
        let probe_tau = self.config.circuit.probe_synapse;
        log::info!(
            "Simulation start: A=({}, {}), {} pulse over [{}, {}), {} steps",
            self.config.a1,
            self.config.a2,
            self.config.fus_target,
            self.config.fus_start,
            self.config.fus_start + self.config.fus_dur,
            num_steps
        );

        let mut cortex = Probe::build("cortex", 0.0, dt, num_steps)?;
        let mut striatum = Probe::build("striatum", probe_tau, dt, num_steps)?;
        let mut gpi = Probe::build("gpi", probe_tau, dt, num_steps)?;
        let mut scaled_gpi = Probe::build("scaled gpi", probe_tau, dt, num_steps)?;
        let mut thalamus = Probe::build("thalamus", probe_tau, dt, num_steps)?;
        let mut times = Vec::with_capacity(num_steps);
        let mut gpi_scale = Vec::with_capacity(num_steps);
        let progress = (num_steps / 10).max(1);

        for k in 1..=num_steps {
            let t = k as f64 * dt;
            let mut drive = self.cortical_input.value(t);
            if let Some(noise) = &self.noise {
                drive += Vector2::new(noise.sample(&mut self.rng), noise.sample(&mut self.rng));
            }
            let scale = self.gpi_scale.value(t);

            let outputs = self.circuit.step(&drive, scale);
            if !outputs.is_finite() {
                self.state = RunState::Complete;
                log::error!("Simulation diverged at t={}", t);
                return Err(BGError::SimulationFailed(format!(
                    "the circuit state diverged at t={}",
                    t
                )));
            }

            times.push(t);
            gpi_scale.push(scale);
            cortex.record(t, &outputs.cortex);
            striatum.record(t, &outputs.striatum);
            gpi.record(t, &outputs.gpi);
            scaled_gpi.record(t, &outputs.scaled_gpi);
            thalamus.record(t, &outputs.thalamus);

            if k % progress == 0 {
                log::debug!(
                    "t={:.3}: thalamus=({:.3}, {:.3})",
                    t,
                    outputs.thalamus[0],
                    outputs.thalamus[1]
                );
            }
        }

        self.state = RunState::Complete;
        let record = SimulationRecord {
            config: self.config.clone(),
            times,
            cortex: cortex.into_series(),
            striatum: striatum.into_series(),
            gpi: gpi.into_series(),
            scaled_gpi: scaled_gpi.into_series(),
            thalamus: thalamus.into_series(),
            gpi_scale,
        };
        log::info!(
            "Simulation done: winner at end is {}",
            record
                .winner_at_end()
                .map_or("none".to_string(), |channel| format!("channel {}", channel))
        );
        Ok(record)
    }
}

/// Build a simulator and run it once.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationRecord, BGError> {
    Simulator::build(config.clone())?.run()
}

/// The channels leading before, during and after the FUS pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseWinners {
    pub before: Option<Channel>,
    pub during: Option<Channel>,
    pub after: Option<Channel>,
}

/// The recorded outputs of a run, one sample per time step for every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub config: SimulationConfig,
    pub times: Vec<f64>,
    pub cortex: TimeSeries,
    pub striatum: TimeSeries,
    pub gpi: TimeSeries,
    pub scaled_gpi: TimeSeries,
    pub thalamus: TimeSeries,
    /// The multiplier applied to the GPi output at each sample.
    pub gpi_scale: Vec<f64>,
}

impl SimulationRecord {
    /// The number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns every recorded node series.
    pub fn series(&self) -> [&TimeSeries; 5] {
        [
            &self.cortex,
            &self.striatum,
            &self.gpi,
            &self.scaled_gpi,
            &self.thalamus,
        ]
    }

    /// Returns an error unless every series holds one sample per recorded time.
    pub fn check_consistency(&self) -> Result<(), BGError> {
        if self.gpi_scale.len() != self.len() {
            return Err(BGError::IncompatibleTimeSeries(format!(
                "GPi scale has {} samples, expected {}",
                self.gpi_scale.len(),
                self.len()
            )));
        }
        match self.series().iter().find(|series| series.times() != &self.times[..]) {
            Some(series) => Err(BGError::IncompatibleTimeSeries(format!(
                "{} is not sampled on the time grid of the run",
                series.label()
            ))),
            None => Ok(()),
        }
    }

    /// The channel leading the thalamus at the last sample.
    pub fn winner_at_end(&self) -> Option<Channel> {
        metrics::winner_at_end(&self.thalamus)
    }

    /// The channel leading the thalamus at the latest sample recorded at or before `t`.
    pub fn leader_at(&self, t: f64) -> Option<Channel> {
        self.thalamus.value_at(t).and_then(|v| metrics::leader(&v))
    }

    /// Every change of the thalamic leader.
    pub fn switches(&self) -> Vec<Switch> {
        metrics::selection_switches(&self.thalamus)
    }

    /// The channel leading the thalamus at every sample of the interval.
    pub fn dominant_channel(&self, interval: &TimeInterval) -> Option<Channel> {
        metrics::dominant_channel(&self.thalamus, interval)
    }

    /// The dominant channel before, during and after the FUS pulse, each phase read after a settling margin.
    pub fn phase_winners(&self, margin: f64) -> Result<PhaseWinners, BGError> {
        let window = self.config.fus_interval()?;
        let end = self.config.run_duration + self.config.dt;
        let before = TimeInterval::build(0.0, window.start())?;
        let after = TimeInterval::build(window.end().min(end), end)?;
        Ok(PhaseWinners {
            before: self.dominant_channel(&before.skip(margin)),
            during: self.dominant_channel(&window.skip(margin)),
            after: self.dominant_channel(&after.skip(margin)),
        })
    }

    /// Save the record to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), BGError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a record from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, BGError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let record: SimulationRecord = serde_json::from_reader(reader)?;
        record.check_consistency()?;
        Ok(record)
    }
}

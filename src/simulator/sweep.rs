//! Batches of independent runs.
use log;
use rayon::prelude::*;

use super::config::{FusTarget, SimulationConfig};
use super::simulator::{run_simulation, SimulationRecord};
use super::MIN_PARALLEL_RUNS;
use crate::error::BGError;

/// Run every configuration and return the records in the same order.
/// Large batches are spread over the rayon thread pool; runs share no state.
pub fn sweep(configs: &[SimulationConfig]) -> Result<Vec<SimulationRecord>, BGError> {
    log::info!("Sweep over {} configurations", configs.len());
    match configs.len() >= MIN_PARALLEL_RUNS {
        true => configs.par_iter().map(run_simulation).collect(),
        false => configs.iter().map(run_simulation).collect(),
    }
}

/// Run the base configuration once per attenuation fraction.
pub fn kappa_sweep(
    base: &SimulationConfig,
    kappas: &[f64],
) -> Result<Vec<SimulationRecord>, BGError> {
    let configs = kappas
        .iter()
        .map(|&kappa| SimulationConfig {
            kappa,
            ..base.clone()
        })
        .collect::<Vec<SimulationConfig>>();
    sweep(&configs)
}

/// Bisect the smallest attenuation fraction that hands the selection to the other channel by the end of the pulse.
/// The leader at the last sample inside the pulse is compared to the leader of the unattenuated run at the same sample.
/// Returns None if even a full attenuation leaves the selection unchanged.
/// The function returns an error if the pulse does not target the cortex or if the tolerance is not positive.
pub fn critical_kappa(base: &SimulationConfig, tolerance: f64) -> Result<Option<f64>, BGError> {
    if base.fus_target != FusTarget::Cortex {
        return Err(BGError::InvalidOperation(
            "the critical attenuation is only defined for a cortical pulse".to_string(),
        ));
    }
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(BGError::InvalidParameter(format!(
            "tolerance must be finite and positive, got {}",
            tolerance
        )));
    }
    base.validate()?;

    let window = base.fus_interval()?;
    if window.length() < base.dt || window.start() >= base.run_duration {
        log::info!("The pulse holds no sample, the selection cannot change");
        return Ok(None);
    }
    let probe_time = (window.end() - base.dt / 2.0).min(base.run_duration);

    let with_kappa = |kappa: f64| SimulationConfig {
        kappa,
        ..base.clone()
    };
    let baseline = run_simulation(&with_kappa(0.0))?.leader_at(probe_time);
    let flips = |kappa: f64| -> Result<bool, BGError> {
        let leader = run_simulation(&with_kappa(kappa))?.leader_at(probe_time);
        Ok(leader.is_some() && leader != baseline)
    };

    if !flips(1.0)? {
        log::info!("Full attenuation does not change the selection");
        return Ok(None);
    }

    let (mut low, mut high) = (0.0, 1.0);
    while high - low > tolerance {
        let mid = (low + high) / 2.0;
        match flips(mid)? {
            true => high = mid,
            false => low = mid,
        }
        log::debug!("Critical attenuation in [{}, {}]", low, high);
    }
    log::info!("Critical attenuation: {}", high);
    Ok(Some(high))
}

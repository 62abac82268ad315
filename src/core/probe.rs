//! Recording of node outputs over time.
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::synapse::Lowpass;
use crate::error::BGError;

/// The recorded values of a node for both channels, one sample per time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    label: String,
    times: Vec<f64>,
    values: Vec<[f64; 2]>,
}

impl TimeSeries {
    /// Create an empty time series.
    pub fn new(label: &str) -> Self {
        TimeSeries {
            label: label.to_string(),
            times: vec![],
            values: vec![],
        }
    }

    /// Create an empty time series with room for the given number of samples.
    pub fn with_capacity(label: &str, capacity: usize) -> Self {
        TimeSeries {
            label: label.to_string(),
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Create a time series from its samples.
    /// The function returns an error if times and values differ in length or if times are not increasing.
    pub fn build(label: &str, times: Vec<f64>, values: Vec<[f64; 2]>) -> Result<Self, BGError> {
        if times.len() != values.len() {
            return Err(BGError::IncompatibleTimeSeries(format!(
                "{} has {} times but {} values",
                label,
                times.len(),
                values.len()
            )));
        }
        if times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BGError::IncompatibleTimeSeries(format!(
                "{} times must be strictly increasing",
                label
            )));
        }
        Ok(TimeSeries {
            label: label.to_string(),
            times,
            values,
        })
    }

    /// Append a sample.
    pub fn push(&mut self, t: f64, values: &Vector2<f64>) {
        self.times.push(t);
        self.values.push([values[0], values[1]]);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    pub fn values(&self) -> &[[f64; 2]] {
        &self.values[..]
    }

    /// Returns the values of a single channel.
    pub fn channel(&self, channel: Channel) -> Vec<f64> {
        self.values.iter().map(|v| v[channel.index()]).collect()
    }

    /// Returns the (time, value) pairs of a single channel.
    pub fn pairs(&self, channel: Channel) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .zip(self.values.iter())
            .map(move |(t, v)| (*t, v[channel.index()]))
    }

    /// Returns the last sample, if any.
    pub fn last(&self) -> Option<(f64, [f64; 2])> {
        self.times.last().copied().zip(self.values.last().copied())
    }

    /// Returns the latest sample recorded at or before the given time, if any.
    pub fn value_at(&self, t: f64) -> Option<[f64; 2]> {
        let pos = self.times.partition_point(|&time| time <= t);
        match pos {
            0 => None,
            _ => Some(self.values[pos - 1]),
        }
    }
}

/// A probe recording a node output through an optional low-pass synapse.
#[derive(Debug, Clone)]
pub struct Probe {
    series: TimeSeries,
    synapse: Lowpass,
}

impl Probe {
    /// Create a probe filtering its samples with the given time constant (zero records raw values).
    pub fn build(label: &str, tau: f64, dt: f64, capacity: usize) -> Result<Self, BGError> {
        Ok(Probe {
            series: TimeSeries::with_capacity(label, capacity),
            synapse: Lowpass::build(tau, dt)?,
        })
    }

    /// Filter the values and record them at the given time.
    pub fn record(&mut self, t: f64, values: &Vector2<f64>) {
        let filtered = self.synapse.filter(values);
        self.series.push(t, &filtered);
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries {
        self.series
    }
}

//! Selection metrics computed from recorded thalamic activity.
//!
//! # Examples
//!
//! ```rust
//! use rusty_bg::core::channel::Channel;
//! use rusty_bg::core::metrics::{dominant_channel, selection_switches};
//! use rusty_bg::core::probe::TimeSeries;
//! use rusty_bg::core::utils::TimeInterval;
//!
//! let series = TimeSeries::build(
//!     "thalamus",
//!     vec![0.0, 1.0, 2.0, 3.0],
//!     vec![[0.9, 0.1], [0.8, 0.2], [0.1, 0.9], [0.2, 0.8]],
//! )
//! .unwrap();
//!
//! let switches = selection_switches(&series);
//! assert_eq!(switches.len(), 1);
//! assert_eq!(switches[0].time, 2.0);
//! assert_eq!(switches[0].to, Channel::Two);
//!
//! let interval = TimeInterval::build(0.0, 2.0).unwrap();
//! assert_eq!(dominant_channel(&series, &interval), Some(Channel::One));
//! ```
use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::probe::TimeSeries;
use super::utils::TimeInterval;

/// Returns the channel with the strictly larger value, or None on a tie.
pub fn leader(values: &[f64; 2]) -> Option<Channel> {
    if values[0] > values[1] {
        Some(Channel::One)
    } else if values[1] > values[0] {
        Some(Channel::Two)
    } else {
        None
    }
}

/// A change of the leading channel between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// The time of the first sample led by the new channel.
    pub time: f64,
    pub from: Channel,
    pub to: Channel,
}

/// Returns every change of leader, ignoring samples where the channels are tied.
pub fn selection_switches(series: &TimeSeries) -> Vec<Switch> {
    let switches = series
        .times()
        .iter()
        .zip(series.values().iter())
        .filter_map(|(t, v)| leader(v).map(|channel| (*t, channel)))
        .tuple_windows()
        .filter(|((_, before), (_, after))| before != after)
        .map(|((_, from), (time, to))| Switch { time, from, to })
        .collect::<Vec<Switch>>();

    for switch in switches.iter() {
        log::debug!(
            "{}: selection switched from channel {} to channel {} at t={:.3}",
            series.label(),
            switch.from,
            switch.to,
            switch.time
        );
    }
    switches
}

/// Returns the channel leading every sample of the interval.
/// None if the interval holds no sample, or if the lead changes or ties within it.
pub fn dominant_channel(series: &TimeSeries, interval: &TimeInterval) -> Option<Channel> {
    series
        .times()
        .iter()
        .zip(series.values().iter())
        .filter(|(t, _)| interval.contains(**t))
        .map(|(_, v)| leader(v))
        .all_equal_value()
        .ok()
        .flatten()
}

/// Returns the leader at the last sample.
pub fn winner_at_end(series: &TimeSeries) -> Option<Channel> {
    series.last().and_then(|(_, v)| leader(&v))
}

/// Returns the mean value of a channel over the samples of the interval, if any.
pub fn mean_activity(series: &TimeSeries, channel: Channel, interval: &TimeInterval) -> Option<f64> {
    let (count, total) = series
        .pairs(channel)
        .filter(|(t, _)| interval.contains(*t))
        .fold((0_usize, 0.0), |(count, total), (_, v)| (count + 1, total + v));
    match count {
        0 => None,
        _ => Some(total / count as f64),
    }
}

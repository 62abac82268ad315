//! Error module for the Rusty BG library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum BGError {
    /// Error for invalid parameters, e.g., a negative duration or an attenuation outside [0, 1].
    InvalidParameter(String),
    /// Error for an ill-formed modulation window.
    InvalidWindow(String),
    /// Error for invalid channel.
    InvalidChannel(String),
    /// Error for time series that cannot be compared, e.g., different lengths.
    IncompatibleTimeSeries(String),
    /// Error for invalid operation, e.g., running a simulator twice.
    InvalidOperation(String),
    /// Error for a run that diverged or otherwise failed to complete.
    SimulationFailed(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for BGError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BGError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            BGError::InvalidWindow(e) => write!(f, "Invalid modulation window: {}", e),
            BGError::InvalidChannel(e) => write!(f, "Invalid channel: {}", e),
            BGError::IncompatibleTimeSeries(e) => write!(f, "Incompatible time series: {}", e),
            BGError::InvalidOperation(e) => write!(f, "Invalid operation: {}", e),
            BGError::SimulationFailed(e) => write!(f, "Simulation failed: {}", e),
            BGError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for BGError {}

impl From<std::io::Error> for BGError {
    fn from(e: std::io::Error) -> Self {
        BGError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for BGError {
    fn from(e: serde_json::Error) -> Self {
        BGError::IOError(e.to_string())
    }
}

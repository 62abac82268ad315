//! Module implementing the two competing action channels.
use serde::{Deserialize, Serialize};
use std::fmt;

use super::NUM_CHANNELS;
use crate::error::BGError;

/// An action channel, numbered 1 and 2 as in the circuit diagrams.
/// Serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    /// Both channels, in order.
    pub const ALL: [Channel; NUM_CHANNELS] = [Channel::One, Channel::Two];

    /// Returns the zero-based position of the channel in per-channel vectors.
    pub fn index(&self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }

    /// Returns the channel stored at the given zero-based position.
    pub fn from_index(index: usize) -> Result<Self, BGError> {
        match index {
            0 => Ok(Channel::One),
            1 => Ok(Channel::Two),
            _ => Err(BGError::InvalidChannel(format!(
                "no channel at position {}",
                index
            ))),
        }
    }

    /// Returns the competing channel.
    pub fn other(&self) -> Channel {
        match self {
            Channel::One => Channel::Two,
            Channel::Two => Channel::One,
        }
    }
}

impl TryFrom<usize> for Channel {
    type Error = BGError;

    fn try_from(number: usize) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Channel::One),
            2 => Ok(Channel::Two),
            _ => Err(BGError::InvalidChannel(format!(
                "channels are numbered 1 and 2, got {}",
                number
            ))),
        }
    }
}

impl From<Channel> for usize {
    fn from(channel: Channel) -> usize {
        channel.index() + 1
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_numbering() {
        assert_eq!(Channel::One.index(), 0);
        assert_eq!(Channel::Two.index(), 1);
        assert_eq!(Channel::from_index(1), Ok(Channel::Two));
        assert_eq!(Channel::try_from(1), Ok(Channel::One));
        assert_eq!(usize::from(Channel::Two), 2);
        assert_eq!(Channel::Two.to_string(), "2");
        assert_eq!(Channel::One.other(), Channel::Two);
        for (index, channel) in Channel::ALL.into_iter().enumerate() {
            assert_eq!(channel.index(), index);
        }
    }

    #[test]
    fn test_invalid_channel() {
        assert!(matches!(Channel::try_from(0), Err(BGError::InvalidChannel(_))));
        assert!(matches!(Channel::try_from(3), Err(BGError::InvalidChannel(_))));
        assert!(matches!(Channel::from_index(2), Err(BGError::InvalidChannel(_))));
    }

    #[test]
    fn test_channel_serde() {
        assert_eq!(serde_json::to_string(&Channel::Two).unwrap(), "2");
        let channel: Channel = serde_json::from_str("1").unwrap();
        assert_eq!(channel, Channel::One);
        assert!(serde_json::from_str::<Channel>("5").is_err());
    }
}

//! Status classification
//!
//! Maps an occupancy count onto the four badge states using fixed thresholds.

use serde::{Deserialize, Serialize};

/// Default upper bound (exclusive) of the "ok" band
pub const DEFAULT_LOW_THRESHOLD: u64 = 30;

/// Default lower bound (inclusive) of the "full" band
pub const DEFAULT_HIGH_THRESHOLD: u64 = 40;

/// Badge state shown next to the live counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Low occupancy
    Ok,
    /// Moderate occupancy
    Warn,
    /// At or above the high threshold
    Full,
    /// The last refresh failed
    Error,
}

/// Colour family of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Orange,
    Red,
}

impl StatusLevel {
    /// Badge text
    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Ok => "🟢 Available",
            StatusLevel::Warn => "🟠 Moderately occupied",
            StatusLevel::Full => "🔴 Full",
            StatusLevel::Error => "Failed to load",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            StatusLevel::Ok => Tone::Green,
            StatusLevel::Warn => Tone::Orange,
            StatusLevel::Full | StatusLevel::Error => Tone::Red,
        }
    }
}

impl std::fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusLevel::Ok => write!(f, "ok"),
            StatusLevel::Warn => write!(f, "warn"),
            StatusLevel::Full => write!(f, "full"),
            StatusLevel::Error => write!(f, "error"),
        }
    }
}

/// Classification thresholds
///
/// Plain configuration values; they are not derived from any capacity the
/// backend might report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: u64,
    pub high: u64,
}

impl Thresholds {
    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// Classify a successfully fetched count
    pub fn classify(&self, count: u64) -> StatusLevel {
        if count < self.low {
            StatusLevel::Ok
        } else if count < self.high {
            StatusLevel::Warn
        } else {
            StatusLevel::Full
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)
    }
}

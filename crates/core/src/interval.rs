//! Validated time intervals on a one-hour episode timeline.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timecode::{self, TIMELINE_SECS};

/// Raw interval as supplied by a caller, both ends in `MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalInput {
    pub start: String,
    pub end: String,
}

impl IntervalInput {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A `[start, end)` span in seconds with `start < end <= 3600`.
///
/// Only constructible through [`TimeInterval::new`] or [`TimeInterval::parse`],
/// so every value in circulation has already been validated. Updates replace
/// the interval wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IntervalInput", into = "IntervalInput")]
pub struct TimeInterval {
    start: u32,
    end: u32,
}

impl TimeInterval {
    pub fn new(start: u32, end: u32) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Range(format!(
                "Interval start ({}) must be before end ({})",
                timecode::encode(start),
                timecode::encode(end)
            )));
        }
        if end > TIMELINE_SECS {
            return Err(CoreError::Range(format!(
                "Interval end ({}) exceeds the episode timeline of {}",
                timecode::encode(end),
                timecode::encode(TIMELINE_SECS)
            )));
        }
        Ok(Self { start, end })
    }

    /// Decode both ends and validate the resulting span.
    pub fn parse(input: &IntervalInput) -> Result<Self, CoreError> {
        let start = timecode::decode(&input.start)?;
        let end = timecode::decode(&input.end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn duration_secs(&self) -> u32 {
        self.end - self.start
    }

    /// Half-open overlap: touching intervals do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            timecode::encode(self.start),
            timecode::encode(self.end)
        )
    }
}

impl TryFrom<IntervalInput> for TimeInterval {
    type Error = CoreError;

    fn try_from(input: IntervalInput) -> Result<Self, Self::Error> {
        Self::parse(&input)
    }
}

impl From<TimeInterval> for IntervalInput {
    fn from(interval: TimeInterval) -> Self {
        Self {
            start: timecode::encode(interval.start),
            end: timecode::encode(interval.end),
        }
    }
}

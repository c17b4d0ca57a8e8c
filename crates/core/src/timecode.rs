//! `MM:SS` time-code conversion.
//!
//! The codec itself is unbounded in minutes; the one-hour episode ceiling is
//! enforced by [`crate::interval::TimeInterval`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Length of every episode timeline in seconds (one hour).
pub const TIMELINE_SECS: u32 = 3_600;

/// Two numeric groups separated by `:`. Seconds are always two digits.
pub const TIMECODE_PATTERN: &str = r"^(\d{1,3}):(\d{2})$";

static TIMECODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIMECODE_PATTERN).expect("valid regex"));

/// Parse `MM:SS` into a second offset.
pub fn decode(code: &str) -> Result<u32, CoreError> {
    let caps = TIMECODE_RE
        .captures(code.trim())
        .ok_or_else(|| CoreError::Format(format!("Invalid time code '{code}'. Expected MM:SS")))?;

    let minutes: u32 = caps[1]
        .parse()
        .map_err(|_| CoreError::Format(format!("Invalid minutes in time code '{code}'")))?;
    let seconds: u32 = caps[2]
        .parse()
        .map_err(|_| CoreError::Format(format!("Invalid seconds in time code '{code}'")))?;

    if seconds > 59 {
        return Err(CoreError::Format(format!(
            "Seconds component of '{code}' must be at most 59"
        )));
    }

    Ok(minutes * 60 + seconds)
}

/// Render a second offset as zero-padded `MM:SS`.
pub fn encode(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

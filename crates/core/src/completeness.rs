//! Episode completeness: do the performances cover the whole timeline?
//!
//! Completeness is always derived on demand from the current intervals and is
//! never stored.

use serde::Serialize;

use crate::interval::TimeInterval;
use crate::timecode::TIMELINE_SECS;
use crate::types::DbId;

/// An episode needs at least this many performances to be complete.
pub const MIN_PERFORMANCES: usize = 5;

/// End of the gap-free coverage that starts at 0.
///
/// Walks the start-ordered intervals keeping the furthest end seen so far; the
/// first interval starting after that point is a gap and stops the walk.
pub fn covered_until(intervals: &[TimeInterval]) -> u32 {
    let mut sorted = intervals.to_vec();
    sorted.sort();

    let mut covered = 0;
    for interval in sorted {
        if interval.start() > covered {
            break;
        }
        covered = covered.max(interval.end());
    }
    covered
}

/// `true` iff there are at least [`MIN_PERFORMANCES`] intervals and together
/// they cover `[0, 3600]` without a gap.
pub fn is_complete(intervals: &[TimeInterval]) -> bool {
    if intervals.len() < MIN_PERFORMANCES {
        return false;
    }
    covered_until(intervals) == TIMELINE_SECS
}

/// Read-only summary of an episode's coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletenessReport {
    pub episode_id: DbId,
    pub performance_count: usize,
    pub duration: u32,
    pub covered_until: u32,
    pub is_complete: bool,
}

impl CompletenessReport {
    pub fn evaluate(episode_id: DbId, intervals: &[TimeInterval]) -> Self {
        Self {
            episode_id,
            performance_count: intervals.len(),
            duration: crate::placement::compute_duration(intervals.iter().copied()),
            covered_until: covered_until(intervals),
            is_complete: is_complete(intervals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalInput;

    fn iv(start: &str, end: &str) -> TimeInterval {
        TimeInterval::parse(&IntervalInput::new(start, end)).unwrap()
    }

    fn five_contiguous() -> Vec<TimeInterval> {
        vec![
            iv("00:00", "12:00"),
            iv("12:00", "24:00"),
            iv("24:00", "36:00"),
            iv("36:00", "48:00"),
            iv("48:00", "60:00"),
        ]
    }

    #[test]
    fn empty_episode_is_incomplete() {
        assert!(!is_complete(&[]));
        let report = CompletenessReport::evaluate(1, &[]);
        assert_eq!(report.duration, 0);
        assert_eq!(report.covered_until, 0);
        assert!(!report.is_complete);
    }

    #[test]
    fn five_contiguous_intervals_are_complete() {
        let intervals = five_contiguous();
        assert!(is_complete(&intervals));
        let report = CompletenessReport::evaluate(1, &intervals);
        assert_eq!(report.duration, TIMELINE_SECS);
        assert_eq!(report.performance_count, 5);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let mut intervals = five_contiguous();
        intervals.reverse();
        assert!(is_complete(&intervals));
    }

    #[test]
    fn fewer_than_five_is_incomplete_even_when_covering() {
        let intervals = vec![
            iv("00:00", "15:00"),
            iv("15:00", "30:00"),
            iv("30:00", "45:00"),
            iv("45:00", "60:00"),
        ];
        assert_eq!(covered_until(&intervals), TIMELINE_SECS);
        assert!(!is_complete(&intervals));
    }

    #[test]
    fn a_gap_makes_it_incomplete() {
        let mut intervals = five_contiguous();
        intervals[2] = iv("24:01", "36:00");
        assert!(!is_complete(&intervals));
        assert_eq!(covered_until(&intervals), 1_440);
    }

    #[test]
    fn ending_short_of_the_hour_is_incomplete() {
        let mut intervals = five_contiguous();
        intervals[4] = iv("48:00", "59:59");
        assert!(!is_complete(&intervals));
    }

    #[test]
    fn contained_interval_does_not_create_a_gap() {
        let intervals = vec![
            iv("00:00", "40:00"),
            iv("05:00", "06:00"),
            iv("10:00", "20:00"),
            iv("39:00", "50:00"),
            iv("50:00", "60:00"),
        ];
        assert!(is_complete(&intervals));
    }

    #[test]
    fn late_first_start_is_a_gap() {
        let intervals = vec![
            iv("00:01", "12:00"),
            iv("12:00", "24:00"),
            iv("24:00", "36:00"),
            iv("36:00", "48:00"),
            iv("48:00", "60:00"),
        ];
        assert!(!is_complete(&intervals));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let intervals = five_contiguous();
        assert_eq!(
            CompletenessReport::evaluate(3, &intervals),
            CompletenessReport::evaluate(3, &intervals)
        );
    }
}

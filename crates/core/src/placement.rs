//! Interval placement on an episode timeline.
//!
//! A [`Timeline`] is a snapshot of every interval currently placed in one
//! episode, kept in start-ascending order, together with the episode's
//! revision counter. [`validate_placement`] decides whether a new interval
//! may join the snapshot under the active [`PlacementPolicy`], while
//! [`validate_replacement`] and [`validate_detachment`] cover edits of an
//! existing entry. The `with_*` builders produce the post-write timeline used
//! to recompute the episode duration before anything is committed.

use crate::error::CoreError;
use crate::interval::TimeInterval;
use crate::timecode::{self, TIMELINE_SECS};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Default upper bound on how far a contiguous append may extend the timeline.
pub const DEFAULT_MAX_SEGMENT_SECS: u32 = TIMELINE_SECS;

/// How a new interval is checked against the existing ones.
///
/// Exactly one policy is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// One unbroken, serially-extended timeline shared by all characters:
    /// each interval starts exactly where the episode's latest one ended and
    /// extends it by at most `max_segment_secs`.
    Contiguous { max_segment_secs: u32 },
    /// Per (episode, character): start no earlier than that character's last
    /// end. Gaps are allowed, characters may overlap each other.
    ForwardPerCharacter,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::Contiguous {
            max_segment_secs: DEFAULT_MAX_SEGMENT_SECS,
        }
    }
}

impl PlacementPolicy {
    /// Parse a policy name (`contiguous` or `forward`).
    pub fn parse(name: &str, max_segment_secs: u32) -> Result<Self, CoreError> {
        if max_segment_secs == 0 {
            return Err(CoreError::Validation(
                "max_segment_secs must be positive".to_string(),
            ));
        }
        match name.trim().to_ascii_lowercase().as_str() {
            "contiguous" | "strict" => Ok(Self::Contiguous { max_segment_secs }),
            "forward" | "forward_per_character" => Ok(Self::ForwardPerCharacter),
            other => Err(CoreError::Validation(format!(
                "Unknown placement policy '{other}'. Expected 'contiguous' or 'forward'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Contiguous { .. } => "contiguous",
            Self::ForwardPerCharacter => "forward",
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline snapshot
// ---------------------------------------------------------------------------

/// One performance's slot on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedInterval {
    pub performance_id: DbId,
    pub character_id: DbId,
    pub interval: TimeInterval,
}

/// Snapshot of an episode's placed intervals at a given revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub episode_id: DbId,
    pub revision: i64,
    entries: Vec<PlacedInterval>,
}

fn sort_entries(entries: &mut [PlacedInterval]) {
    entries.sort_by_key(|e| (e.interval.start(), e.interval.end(), e.performance_id));
}

impl Timeline {
    pub fn new(episode_id: DbId, revision: i64, mut entries: Vec<PlacedInterval>) -> Self {
        sort_entries(&mut entries);
        Self {
            episode_id,
            revision,
            entries,
        }
    }

    /// Entries in start-ascending order.
    pub fn entries(&self) -> &[PlacedInterval] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn intervals(&self) -> Vec<TimeInterval> {
        self.entries.iter().map(|e| e.interval).collect()
    }

    pub fn contains(&self, performance_id: DbId) -> bool {
        self.entries.iter().any(|e| e.performance_id == performance_id)
    }

    /// Index of `performance_id` in start order.
    pub fn position(&self, performance_id: DbId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.performance_id == performance_id)
    }

    /// End of the episode's globally latest interval, or 0 when empty.
    pub fn last_end(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.interval.end())
            .max()
            .unwrap_or(0)
    }

    /// End of the last (by start) interval placed for `character_id`.
    pub fn last_end_for_character(&self, character_id: DbId) -> Option<u32> {
        self.entries
            .iter()
            .filter(|e| e.character_id == character_id)
            .last()
            .map(|e| e.interval.end())
    }

    /// Derived episode duration: the maximum end offset, or 0.
    pub fn duration(&self) -> u32 {
        compute_duration(self.entries.iter().map(|e| e.interval))
    }

    pub fn with_inserted(&self, placed: PlacedInterval) -> Self {
        let mut entries = self.entries.clone();
        entries.push(placed);
        Self::new(self.episode_id, self.revision, entries)
    }

    pub fn with_removed(&self, performance_id: DbId) -> Self {
        let entries = self
            .entries
            .iter()
            .copied()
            .filter(|e| e.performance_id != performance_id)
            .collect();
        Self::new(self.episode_id, self.revision, entries)
    }

    pub fn with_replaced(&self, placed: PlacedInterval) -> Self {
        self.with_removed(placed.performance_id).with_inserted(placed)
    }

    pub fn without_character(&self, character_id: DbId) -> Self {
        let entries = self
            .entries
            .iter()
            .copied()
            .filter(|e| e.character_id != character_id)
            .collect();
        Self::new(self.episode_id, self.revision, entries)
    }
}

/// `max(end)` over the intervals, or 0 when there are none.
pub fn compute_duration(intervals: impl IntoIterator<Item = TimeInterval>) -> u32 {
    intervals.into_iter().map(|i| i.end()).max().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check whether a new `candidate` may join `timeline` for `character_id`.
pub fn validate_placement(
    policy: PlacementPolicy,
    timeline: &Timeline,
    character_id: DbId,
    candidate: TimeInterval,
) -> Result<(), CoreError> {
    match policy {
        PlacementPolicy::Contiguous { max_segment_secs } => {
            validate_append(timeline.last_end(), candidate, max_segment_secs)
        }
        PlacementPolicy::ForwardPerCharacter => {
            let bound = timeline.last_end_for_character(character_id).unwrap_or(0);
            if candidate.start() < bound {
                return Err(CoreError::Overlap(format!(
                    "Interval {candidate} starts before this character's previous appearance ends at {}",
                    timecode::encode(bound)
                )));
            }
            // The 3600s ceiling is already guaranteed by `TimeInterval`.
            Ok(())
        }
    }
}

/// Check an in-place edit of a performance already on `timeline`.
///
/// The edited entry is compared with its neighbours only. Under contiguity
/// the final entry may be re-cut like a fresh append, while any earlier entry
/// must keep filling its slot exactly. Under the forward policy the edit must
/// fit between the same character's previous and next appearances.
pub fn validate_replacement(
    policy: PlacementPolicy,
    timeline: &Timeline,
    edited: PlacedInterval,
) -> Result<(), CoreError> {
    let Some(index) = timeline.position(edited.performance_id) else {
        return validate_placement(policy, timeline, edited.character_id, edited.interval);
    };
    let current = timeline.entries[index];
    let candidate = edited.interval;

    match policy {
        PlacementPolicy::Contiguous { max_segment_secs } => {
            if candidate == current.interval {
                return Ok(());
            }
            let prev_end = timeline.entries[..index]
                .iter()
                .map(|e| e.interval.end())
                .max()
                .unwrap_or(0);
            match timeline.entries.get(index + 1) {
                None => validate_append(prev_end, candidate, max_segment_secs),
                Some(next) => validate_slot(prev_end, next.interval.start(), candidate),
            }
        }
        PlacementPolicy::ForwardPerCharacter => {
            if candidate == current.interval && edited.character_id == current.character_id {
                return Ok(());
            }
            let mut prev_end = 0;
            let mut next_start = None;
            for e in timeline.entries.iter().filter(|e| {
                e.character_id == edited.character_id
                    && e.performance_id != edited.performance_id
            }) {
                if e.interval.start() <= candidate.start() {
                    prev_end = e.interval.end();
                } else {
                    next_start = Some(e.interval.start());
                    break;
                }
            }
            if candidate.start() < prev_end {
                return Err(CoreError::Overlap(format!(
                    "Interval {candidate} starts before this character's previous appearance ends at {}",
                    timecode::encode(prev_end)
                )));
            }
            match next_start {
                Some(next) if candidate.end() > next => Err(CoreError::Overlap(format!(
                    "Interval {candidate} runs into this character's next appearance at {}",
                    timecode::encode(next)
                ))),
                _ => Ok(()),
            }
        }
    }
}

/// Check that `performance_id` may leave `timeline` for another episode.
///
/// Under contiguity only the final entry can leave without opening a hole.
pub fn validate_detachment(
    policy: PlacementPolicy,
    timeline: &Timeline,
    performance_id: DbId,
) -> Result<(), CoreError> {
    match (policy, timeline.position(performance_id)) {
        (PlacementPolicy::Contiguous { .. }, Some(index)) if index + 1 < timeline.len() => {
            let interval = timeline.entries[index].interval;
            Err(CoreError::Gap(format!(
                "Interval {interval} is not the last one of episode {}; moving it would leave a gap",
                timeline.episode_id
            )))
        }
        _ => Ok(()),
    }
}

/// Contiguous append after `last_end`, bounded by the segment window.
fn validate_append(
    last_end: u32,
    candidate: TimeInterval,
    max_segment_secs: u32,
) -> Result<(), CoreError> {
    if candidate.start() < last_end {
        return Err(CoreError::Overlap(format!(
            "Interval {candidate} overlaps the episode timeline, which ends at {}",
            timecode::encode(last_end)
        )));
    }
    if candidate.start() > last_end {
        return Err(CoreError::Gap(format!(
            "Interval {candidate} leaves a gap: the next interval must start at {}",
            timecode::encode(last_end)
        )));
    }

    let window_end = last_end.saturating_add(max_segment_secs).min(TIMELINE_SECS);
    if candidate.end() > window_end {
        return Err(CoreError::Range(format!(
            "Interval {candidate} may extend the timeline to at most {}",
            timecode::encode(window_end)
        )));
    }
    Ok(())
}

/// Contiguous slot between two neighbours: `[prev_end, next_start)` exactly.
fn validate_slot(prev_end: u32, next_start: u32, candidate: TimeInterval) -> Result<(), CoreError> {
    let slot = format!(
        "{}-{}",
        timecode::encode(prev_end),
        timecode::encode(next_start)
    );
    if candidate.start() < prev_end {
        return Err(CoreError::Overlap(format!(
            "Interval {candidate} overlaps the previous interval; it must fill {slot}"
        )));
    }
    if candidate.start() > prev_end {
        return Err(CoreError::Gap(format!(
            "Interval {candidate} leaves a gap before it; it must fill {slot}"
        )));
    }
    if candidate.end() > next_start {
        return Err(CoreError::Overlap(format!(
            "Interval {candidate} overlaps the next interval; it must fill {slot}"
        )));
    }
    if candidate.end() < next_start {
        return Err(CoreError::Gap(format!(
            "Interval {candidate} leaves a gap after it; it must fill {slot}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalInput;

    const CONTIGUOUS: PlacementPolicy = PlacementPolicy::Contiguous {
        max_segment_secs: DEFAULT_MAX_SEGMENT_SECS,
    };

    fn iv(start: &str, end: &str) -> TimeInterval {
        TimeInterval::parse(&IntervalInput::new(start, end)).unwrap()
    }

    fn placed(performance_id: DbId, character_id: DbId, start: &str, end: &str) -> PlacedInterval {
        PlacedInterval {
            performance_id,
            character_id,
            interval: iv(start, end),
        }
    }

    fn timeline(entries: Vec<PlacedInterval>) -> Timeline {
        Timeline::new(1, 0, entries)
    }

    // -- policy parsing ------------------------------------------------------

    #[test]
    fn parses_policy_names() {
        assert_eq!(
            PlacementPolicy::parse("Contiguous", 600).unwrap(),
            PlacementPolicy::Contiguous { max_segment_secs: 600 }
        );
        assert_eq!(
            PlacementPolicy::parse("forward", 600).unwrap(),
            PlacementPolicy::ForwardPerCharacter
        );
        assert!(PlacementPolicy::parse("both", 600).is_err());
        assert!(PlacementPolicy::parse("contiguous", 0).is_err());
    }

    // -- timeline ordering ---------------------------------------------------

    #[test]
    fn timeline_is_start_ordered_regardless_of_insert_order() {
        let t = timeline(vec![])
            .with_inserted(placed(3, 1, "24:00", "36:00"))
            .with_inserted(placed(1, 1, "00:00", "12:00"))
            .with_inserted(placed(2, 2, "12:00", "24:00"));
        let starts: Vec<u32> = t.entries().iter().map(|e| e.interval.start()).collect();
        assert_eq!(starts, vec![0, 720, 1_440]);
    }

    #[test]
    fn replace_reorders_the_entry() {
        let t = timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 1, "10:00", "20:00"),
        ])
        .with_replaced(placed(1, 1, "30:00", "40:00"));
        let ids: Vec<DbId> = t.entries().iter().map(|e| e.performance_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn duration_tracks_max_end() {
        assert_eq!(timeline(vec![]).duration(), 0);
        let t = timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 2, "05:00", "30:00"),
            placed(3, 1, "10:00", "20:00"),
        ]);
        assert_eq!(t.duration(), 1_800);
        assert_eq!(t.with_removed(2).duration(), 1_200);
        assert_eq!(t.without_character(1).duration(), 1_800);
        assert_eq!(t.without_character(2).without_character(1).duration(), 0);
    }

    // -- contiguous policy ---------------------------------------------------

    #[test]
    fn contiguous_first_interval_must_start_at_zero() {
        let t = timeline(vec![]);
        assert!(validate_placement(CONTIGUOUS, &t, 1, iv("00:00", "10:00")).is_ok());
        assert!(matches!(
            validate_placement(CONTIGUOUS, &t, 1, iv("00:01", "10:00")),
            Err(CoreError::Gap(_))
        ));
    }

    #[test]
    fn contiguous_rejects_overlap_and_gap() {
        let t = timeline(vec![placed(1, 1, "00:00", "10:00")]);
        assert!(matches!(
            validate_placement(CONTIGUOUS, &t, 2, iv("05:00", "15:00")),
            Err(CoreError::Overlap(_))
        ));
        assert!(matches!(
            validate_placement(CONTIGUOUS, &t, 2, iv("10:01", "15:00")),
            Err(CoreError::Gap(_))
        ));
        assert!(validate_placement(CONTIGUOUS, &t, 2, iv("10:00", "15:00")).is_ok());
    }

    #[test]
    fn contiguous_applies_across_characters() {
        let t = timeline(vec![placed(1, 1, "00:00", "10:00")]);
        // A different character still has to continue the shared timeline.
        assert!(matches!(
            validate_placement(CONTIGUOUS, &t, 9, iv("00:00", "05:00")),
            Err(CoreError::Overlap(_))
        ));
    }

    #[test]
    fn contiguous_window_limits_extension() {
        let policy = PlacementPolicy::Contiguous { max_segment_secs: 60 };
        let t = timeline(vec![placed(1, 1, "00:00", "10:00")]);
        assert!(validate_placement(policy, &t, 1, iv("10:00", "11:00")).is_ok());
        assert!(matches!(
            validate_placement(policy, &t, 1, iv("10:00", "11:01")),
            Err(CoreError::Range(_))
        ));
    }

    // -- contiguous edits ----------------------------------------------------

    fn chain() -> Timeline {
        timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 1, "10:00", "20:00"),
            placed(3, 2, "20:00", "30:00"),
        ])
    }

    #[test]
    fn contiguous_last_entry_may_be_recut() {
        let t = chain();
        assert!(validate_replacement(CONTIGUOUS, &t, placed(3, 2, "20:00", "25:00")).is_ok());
        assert!(validate_replacement(CONTIGUOUS, &t, placed(3, 2, "20:00", "45:00")).is_ok());
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(3, 2, "19:00", "25:00")),
            Err(CoreError::Overlap(_))
        ));
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(3, 2, "21:00", "25:00")),
            Err(CoreError::Gap(_))
        ));
    }

    #[test]
    fn contiguous_inner_entry_keeps_its_slot() {
        let t = chain();
        // Same slot, different character.
        assert!(validate_replacement(CONTIGUOUS, &t, placed(1, 7, "00:00", "10:00")).is_ok());
        assert!(validate_replacement(CONTIGUOUS, &t, placed(2, 7, "10:00", "20:00")).is_ok());
    }

    #[test]
    fn contiguous_inner_entry_cannot_open_a_hole() {
        let t = chain();
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(1, 1, "30:00", "40:00")),
            Err(CoreError::Gap(_))
        ));
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(2, 1, "10:00", "15:00")),
            Err(CoreError::Gap(_))
        ));
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(2, 1, "10:00", "25:00")),
            Err(CoreError::Overlap(_))
        ));
        assert!(matches!(
            validate_replacement(CONTIGUOUS, &t, placed(2, 1, "05:00", "20:00")),
            Err(CoreError::Overlap(_))
        ));
    }

    #[test]
    fn contiguous_only_the_last_entry_may_leave() {
        let t = chain();
        assert!(validate_detachment(CONTIGUOUS, &t, 3).is_ok());
        assert!(matches!(
            validate_detachment(CONTIGUOUS, &t, 1),
            Err(CoreError::Gap(_))
        ));
        assert!(matches!(
            validate_detachment(CONTIGUOUS, &t, 2),
            Err(CoreError::Gap(_))
        ));
        assert!(validate_detachment(PlacementPolicy::ForwardPerCharacter, &t, 1).is_ok());
    }

    // -- forward-per-character policy ----------------------------------------

    #[test]
    fn forward_allows_gaps_and_cross_character_overlap() {
        let policy = PlacementPolicy::ForwardPerCharacter;
        let t = timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 2, "05:00", "15:00"),
        ]);
        assert!(validate_placement(policy, &t, 1, iv("20:00", "30:00")).is_ok());
        assert!(validate_placement(policy, &t, 3, iv("00:00", "60:00")).is_ok());
    }

    #[test]
    fn forward_rejects_going_back_for_same_character() {
        let policy = PlacementPolicy::ForwardPerCharacter;
        let t = timeline(vec![placed(1, 1, "00:00", "10:00")]);
        assert!(matches!(
            validate_placement(policy, &t, 1, iv("09:59", "12:00")),
            Err(CoreError::Overlap(_))
        ));
        assert!(validate_placement(policy, &t, 1, iv("10:00", "12:00")).is_ok());
    }

    #[test]
    fn forward_edit_is_checked_against_neighbours() {
        let policy = PlacementPolicy::ForwardPerCharacter;
        let t = timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 1, "10:00", "20:00"),
            placed(3, 1, "30:00", "40:00"),
        ]);
        // Re-cutting a middle entry within its neighbours.
        assert!(validate_replacement(policy, &t, placed(2, 1, "12:00", "30:00")).is_ok());
        // Handing the first entry to a character with no other appearances.
        assert!(validate_replacement(policy, &t, placed(1, 2, "00:00", "10:00")).is_ok());
        assert!(matches!(
            validate_replacement(policy, &t, placed(2, 1, "09:00", "20:00")),
            Err(CoreError::Overlap(_))
        ));
        assert!(matches!(
            validate_replacement(policy, &t, placed(2, 1, "10:00", "31:00")),
            Err(CoreError::Overlap(_))
        ));
    }

    #[test]
    fn forward_character_change_checks_the_new_character() {
        let policy = PlacementPolicy::ForwardPerCharacter;
        let t = timeline(vec![
            placed(1, 1, "00:00", "10:00"),
            placed(2, 2, "05:00", "15:00"),
        ]);
        assert!(matches!(
            validate_replacement(policy, &t, placed(2, 1, "05:00", "15:00")),
            Err(CoreError::Overlap(_))
        ));
    }
}

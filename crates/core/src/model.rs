//! Persisted records and the change sets exchanged with a [`CatalogStore`].
//!
//! Records reference each other and the reference data by identifier only;
//! the catalog services populate names into view types before returning.
//!
//! [`CatalogStore`]: crate::store::CatalogStore

use crate::category::CategoryId;
use crate::interval::TimeInterval;
use crate::lifecycle::StatusId;
use crate::placement::PlacedInterval;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    pub specie_id: CategoryId,
    /// Free-form sub-type, stored uppercased.
    pub kind: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Character {
    pub fn identity(&self) -> CharacterIdentity {
        CharacterIdentity {
            name: self.name.clone(),
            specie_id: self.specie_id,
            kind: self.kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCharacter {
    pub name: String,
    pub specie_id: CategoryId,
    pub kind: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub status_id: StatusId,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterChanges {
    pub name: Option<String>,
    pub specie_id: Option<CategoryId>,
    pub kind: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

/// The `(name, specie, type)` triple that must be unique among active characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterIdentity {
    pub name: String,
    pub specie_id: CategoryId,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterFilter {
    pub status_id: StatusId,
    pub specie_id: Option<CategoryId>,
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: DbId,
    pub name: String,
    pub air_date: Option<String>,
    pub season_id: Option<CategoryId>,
    /// Derived from the performances; never set by a caller.
    pub duration: u32,
    pub status_id: StatusId,
    /// Bumped by every committed timeline change.
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub name: String,
    pub air_date: Option<String>,
    pub season_id: Option<CategoryId>,
    pub status_id: StatusId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeChanges {
    pub name: Option<String>,
    pub air_date: Option<String>,
    pub season_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeFilter {
    pub status_id: StatusId,
    pub season_id: Option<CategoryId>,
}

// ---------------------------------------------------------------------------
// Performances
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub id: DbId,
    pub episode_id: DbId,
    pub character_id: DbId,
    pub interval: TimeInterval,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Performance {
    pub fn placed(&self) -> PlacedInterval {
        PlacedInterval {
            performance_id: self.id,
            character_id: self.character_id,
            interval: self.interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPerformance {
    pub episode_id: DbId,
    pub character_id: DbId,
    pub interval: TimeInterval,
}

/// A single performance mutation inside a [`TimelineCommit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceOp {
    Insert(NewPerformance),
    /// Wholesale replacement of an existing performance.
    Replace { id: DbId, with: NewPerformance },
    Delete { id: DbId },
    /// Cascade removal of every performance of a character in an episode.
    DeleteForCharacter { episode_id: DbId, character_id: DbId },
}

/// Expected revision and recomputed duration for one touched episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRevision {
    pub episode_id: DbId,
    pub expected_revision: i64,
    pub duration: u32,
}

/// An all-or-nothing timeline write.
///
/// The store must verify every `expected_revision`, bump it, store the new
/// duration and apply `ops`, or do nothing and report
/// [`CoreError::ConcurrentWrite`](crate::error::CoreError::ConcurrentWrite).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineCommit {
    pub revisions: Vec<EpisodeRevision>,
    pub ops: Vec<PerformanceOp>,
}

/// Outcome of a [`TimelineCommit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    /// Inserted or replaced performances, in op order.
    pub written: Vec<Performance>,
    /// Number of performances deleted.
    pub deleted: u64,
}

/// Listing filter for performances. All set fields must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceFilter {
    pub episode_id: Option<DbId>,
    pub episode_status_id: Option<StatusId>,
    pub season_id: Option<CategoryId>,
    pub character_id: Option<DbId>,
    pub character_status_id: Option<StatusId>,
}

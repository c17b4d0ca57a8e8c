//! Soft lifecycle state for characters and episodes.
//!
//! Characters and episodes are never physically deleted. Each carries exactly
//! one current status, assigned [`DEFAULT_STATUS`] at creation and moved only
//! along the typed transition table below. The [`LifecycleGate`] restricts
//! reads and writes to entities currently holding an expected status.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::model::{Character, Episode};
use crate::store::CatalogStore;
use crate::types::DbId;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

// ---------------------------------------------------------------------------
// Entity kinds and statuses
// ---------------------------------------------------------------------------

/// Entity types that carry a lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Episode,
}

impl EntityKind {
    /// StatusRelation key for this kind.
    pub fn key(self) -> &'static str {
        match self {
            Self::Character => "characters",
            Self::Episode => "episodes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Episode => "Episode",
        }
    }
}

/// Registered lifecycle values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    Active,
    Suspended,
    Cancelled,
}

/// Status assigned to every character and episode at creation.
pub const DEFAULT_STATUS: LifecycleStatus = LifecycleStatus::Active;

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 3] = [Self::Active, Self::Suspended, Self::Cancelled];

    /// Registered status name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Case-insensitive parse of a status name.
    pub fn parse(name: &str) -> CoreResult<Self> {
        let normalized = name.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|s| s.name() == normalized)
            .ok_or_else(|| CoreError::not_found("Status", normalized))
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

const CHARACTER_TRANSITIONS: &[(LifecycleStatus, LifecycleStatus)] =
    &[(LifecycleStatus::Active, LifecycleStatus::Suspended)];

const EPISODE_TRANSITIONS: &[(LifecycleStatus, LifecycleStatus)] =
    &[(LifecycleStatus::Active, LifecycleStatus::Cancelled)];

/// Allowed `(from, to)` pairs for `kind`. There is no reactivation path.
pub fn transitions(kind: EntityKind) -> &'static [(LifecycleStatus, LifecycleStatus)] {
    match kind {
        EntityKind::Character => CHARACTER_TRANSITIONS,
        EntityKind::Episode => EPISODE_TRANSITIONS,
    }
}

pub fn can_transition(kind: EntityKind, from: LifecycleStatus, to: LifecycleStatus) -> bool {
    transitions(kind).contains(&(from, to))
}

/// Status a removal request moves the entity to.
pub fn removal_status(kind: EntityKind) -> LifecycleStatus {
    match kind {
        EntityKind::Character => LifecycleStatus::Suspended,
        EntityKind::Episode => LifecycleStatus::Cancelled,
    }
}

// ---------------------------------------------------------------------------
// Status records
// ---------------------------------------------------------------------------

/// A registered status row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
}

impl Status {
    pub fn lifecycle(&self) -> CoreResult<LifecycleStatus> {
        LifecycleStatus::parse(&self.name)
    }
}

/// Entity returned by a lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transitioned {
    Character(Character),
    Episode(Episode),
}

impl Transitioned {
    fn status_id(&self) -> StatusId {
        match self {
            Self::Character(c) => c.status_id,
            Self::Episode(e) => e.status_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Status-restricted access to characters and episodes.
///
/// A missing entity and an entity in another status both surface as the same
/// `NotFound`, so suspended or cancelled records are not revealed.
pub struct LifecycleGate<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> LifecycleGate<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Resolve the registered record for `status`.
    ///
    /// An unregistered status is a configuration error and fails with
    /// `NotFound`.
    pub async fn status_record(&self, status: LifecycleStatus) -> CoreResult<Status> {
        self.store
            .find_status_by_name(status.name())
            .await?
            .ok_or_else(|| CoreError::not_found("Status", status.name()))
    }

    /// Parse and resolve a caller-supplied status name.
    pub async fn status_by_name(&self, name: &str) -> CoreResult<Status> {
        let status = LifecycleStatus::parse(name)?;
        self.status_record(status).await
    }

    pub async fn require_character(
        &self,
        id: DbId,
        expected: LifecycleStatus,
    ) -> CoreResult<Character> {
        let status = self.status_record(expected).await?;
        self.store
            .find_character(id, Some(status.id))
            .await?
            .ok_or_else(|| CoreError::not_found("Character", id))
    }

    pub async fn require_episode(&self, id: DbId, expected: LifecycleStatus) -> CoreResult<Episode> {
        let status = self.status_record(expected).await?;
        self.store
            .find_episode(id, Some(status.id))
            .await?
            .ok_or_else(|| CoreError::not_found("Episode", id))
    }

    /// Move an entity to `new_status`.
    ///
    /// The target must be legal for `kind` under its StatusRelation and the
    /// transition table must permit it from the entity's current status.
    pub async fn transition(
        &self,
        kind: EntityKind,
        id: DbId,
        new_status: &str,
    ) -> CoreResult<Transitioned> {
        let target = LifecycleStatus::parse(new_status)?;
        let target_record = self.status_record(target).await?;

        let legal = self
            .store
            .find_status_relation(kind)
            .await?
            .ok_or_else(|| CoreError::not_found("StatusRelation", kind.key()))?;
        if !legal.contains(&target_record.id) {
            return Err(CoreError::not_found(
                "Status",
                format!("{target} for {}", kind.key()),
            ));
        }

        let current_id = match kind {
            EntityKind::Character => self.store.find_character(id, None).await?.map(|c| c.status_id),
            EntityKind::Episode => self.store.find_episode(id, None).await?.map(|e| e.status_id),
        }
        .ok_or_else(|| CoreError::not_found(kind.label(), id))?;

        let current = self
            .store
            .find_status(current_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Status", current_id))?
            .lifecycle()?;

        if !can_transition(kind, current, target) {
            tracing::debug!(
                entity = kind.key(),
                id,
                from = %current,
                to = %target,
                "Transition refused"
            );
            return Err(CoreError::not_found(kind.label(), id));
        }

        let swapped = match kind {
            EntityKind::Character => self
                .store
                .swap_character_status(id, current_id, target_record.id)
                .await?
                .map(Transitioned::Character),
            EntityKind::Episode => self
                .store
                .swap_episode_status(id, current_id, target_record.id)
                .await?
                .map(Transitioned::Episode),
        }
        .ok_or_else(|| {
            CoreError::Conflict(format!(
                "{} {id} changed status concurrently",
                kind.label()
            ))
        })?;

        debug_assert_eq!(swapped.status_id(), target_record.id);
        tracing::info!(
            entity = kind.key(),
            id,
            from = %current,
            to = %target,
            "Lifecycle transition applied"
        );
        Ok(swapped)
    }
}

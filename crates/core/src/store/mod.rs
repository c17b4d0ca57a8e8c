//! Persistence contract for the catalog.
//!
//! The catalog services only ever talk to a [`CatalogStore`]. It behaves like
//! a document store keyed by opaque identifiers: references between records
//! are identifiers, never joins the caller has to know about.
//!
//! The one write that needs more than single-record atomicity is the timeline
//! commit: see [`CatalogStore::commit_timeline`]. Implementations provide it as
//! a compare-and-set on the per-episode revision counter so that two writers
//! validating against the same snapshot cannot both succeed.

pub mod memory;

use async_trait::async_trait;

use crate::category::{Category, CategoryId, CategoryType};
use crate::error::CoreResult;
use crate::lifecycle::{EntityKind, Status, StatusId};
use crate::model::{
    Character, CharacterChanges, CharacterFilter, CharacterIdentity, CommitOutcome, Episode,
    EpisodeChanges, EpisodeFilter, NewCharacter, NewEpisode, Performance, PerformanceFilter,
    TimelineCommit,
};
use crate::pagination::PageWindow;
use crate::placement::Timeline;
use crate::types::DbId;

pub use memory::MemoryStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Cheap liveness probe.
    async fn health_check(&self) -> CoreResult<()>;

    // --- Categories ---

    async fn find_category(&self, id: CategoryId) -> CoreResult<Option<Category>>;

    /// Exact match on the normalized (uppercase) name.
    async fn find_category_by_name(&self, name: &str) -> CoreResult<Option<Category>>;

    async fn insert_category(&self, name: &str) -> CoreResult<Category>;

    /// Whether a CategoryRelation exists for `category_type`.
    async fn category_relation_exists(&self, category_type: CategoryType) -> CoreResult<bool>;

    async fn relation_contains(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<bool>;

    async fn add_relation_member(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<()>;

    /// Members in registration order.
    async fn list_relation_members(&self, category_type: CategoryType) -> CoreResult<Vec<Category>>;

    // --- Statuses ---

    async fn find_status(&self, id: StatusId) -> CoreResult<Option<Status>>;

    async fn find_status_by_name(&self, name: &str) -> CoreResult<Option<Status>>;

    /// Status ids legal for `kind`, or `None` when no relation is registered.
    async fn find_status_relation(&self, kind: EntityKind) -> CoreResult<Option<Vec<StatusId>>>;

    // --- Characters ---

    async fn insert_character(&self, input: &NewCharacter) -> CoreResult<Character>;

    /// `status = Some(..)` restricts the lookup to characters in that status.
    async fn find_character(&self, id: DbId, status: Option<StatusId>)
        -> CoreResult<Option<Character>>;

    async fn find_character_by_identity(
        &self,
        identity: &CharacterIdentity,
        status: StatusId,
    ) -> CoreResult<Option<Character>>;

    /// Apply `changes` if the character is still in `status`.
    async fn update_character(
        &self,
        id: DbId,
        status: StatusId,
        changes: &CharacterChanges,
    ) -> CoreResult<Option<Character>>;

    async fn list_characters(
        &self,
        filter: &CharacterFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Character>, i64)>;

    /// Compare-and-set of `status_id` from `from` to `to`.
    async fn swap_character_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Character>>;

    // --- Episodes ---

    async fn insert_episode(&self, input: &NewEpisode) -> CoreResult<Episode>;

    async fn find_episode(&self, id: DbId, status: Option<StatusId>) -> CoreResult<Option<Episode>>;

    async fn find_episode_by_name(
        &self,
        name: &str,
        season_id: Option<CategoryId>,
        status: StatusId,
    ) -> CoreResult<Option<Episode>>;

    async fn update_episode(
        &self,
        id: DbId,
        status: StatusId,
        changes: &EpisodeChanges,
    ) -> CoreResult<Option<Episode>>;

    async fn list_episodes(
        &self,
        filter: &EpisodeFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Episode>, i64)>;

    async fn swap_episode_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Episode>>;

    // --- Performances ---

    async fn find_performance(&self, id: DbId) -> CoreResult<Option<Performance>>;

    /// Snapshot of the episode's revision and its start-ordered performances.
    ///
    /// Fails with `NotFound` when the episode does not exist.
    async fn load_timeline(&self, episode_id: DbId) -> CoreResult<Timeline>;

    /// Atomically apply a timeline write.
    ///
    /// Every `revisions` entry must still match the stored revision; if any
    /// does not, nothing is written and `ConcurrentWrite` is returned.
    /// Otherwise each touched episode gets `revision + 1` and its new
    /// duration, and the `ops` are applied in order.
    async fn commit_timeline(&self, commit: &TimelineCommit) -> CoreResult<CommitOutcome>;

    /// Ordered by episode id, then interval start.
    async fn list_performances(
        &self,
        filter: &PerformanceFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Performance>, i64)>;
}

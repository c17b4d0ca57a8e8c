//! PostgreSQL implementation of [`CatalogStore`].
//!
//! Single-record writes are plain statements. A timeline commit runs in one
//! transaction: every touched episode's revision is compared-and-set first
//! (in ascending id order, so two commits touching the same pair of
//! episodes lock them in the same order), then the performance ops apply.
//! Any failure drops the transaction, which rolls it back.

use async_trait::async_trait;
use catalog_core::category::{Category, CategoryId, CategoryType};
use catalog_core::error::{CoreError, CoreResult};
use catalog_core::lifecycle::{EntityKind, Status, StatusId};
use catalog_core::model::{
    Character, CharacterChanges, CharacterFilter, CharacterIdentity, CommitOutcome, Episode,
    EpisodeChanges, EpisodeFilter, NewCharacter, NewEpisode, NewPerformance, Performance,
    PerformanceFilter, PerformanceOp, TimelineCommit,
};
use catalog_core::pagination::PageWindow;
use catalog_core::placement::Timeline;
use catalog_core::store::CatalogStore;
use catalog_core::types::DbId;

use crate::error::map_db_error;
use crate::models::episode::EpisodeRow;
use crate::models::performance::into_performances;
use crate::models::secs_to_db;
use crate::repositories::performance_repo::PerformanceWrite;
use crate::repositories::{CategoryRepo, CharacterRepo, EpisodeRepo, PerformanceRepo, StatusRepo};
use crate::DbPool;

/// [`CatalogStore`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn write_columns(input: &NewPerformance) -> CoreResult<PerformanceWrite> {
    Ok(PerformanceWrite {
        episode_id: input.episode_id,
        character_id: input.character_id,
        start_secs: secs_to_db(input.interval.start(), "start_secs")?,
        end_secs: secs_to_db(input.interval.end(), "end_secs")?,
    })
}

fn into_episode(row: Option<EpisodeRow>) -> CoreResult<Option<Episode>> {
    row.map(Episode::try_from).transpose()
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn health_check(&self) -> CoreResult<()> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }

    // --- Categories ---

    async fn find_category(&self, id: CategoryId) -> CoreResult<Option<Category>> {
        let row = CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Category::from))
    }

    async fn find_category_by_name(&self, name: &str) -> CoreResult<Option<Category>> {
        let row = CategoryRepo::find_by_name(&self.pool, name)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Category::from))
    }

    async fn insert_category(&self, name: &str) -> CoreResult<Category> {
        let row = CategoryRepo::create(&self.pool, name)
            .await
            .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn category_relation_exists(&self, category_type: CategoryType) -> CoreResult<bool> {
        CategoryRepo::relation_exists(&self.pool, category_type.key())
            .await
            .map_err(map_db_error)
    }

    async fn relation_contains(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<bool> {
        CategoryRepo::relation_contains(&self.pool, category_type.key(), category_id)
            .await
            .map_err(map_db_error)
    }

    async fn add_relation_member(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<()> {
        let added = CategoryRepo::add_member(&self.pool, category_type.key(), category_id)
            .await
            .map_err(map_db_error)?;
        if !added {
            return Err(CoreError::not_found("CategoryRelation", category_type.key()));
        }
        Ok(())
    }

    async fn list_relation_members(&self, category_type: CategoryType) -> CoreResult<Vec<Category>> {
        let rows = CategoryRepo::list_members(&self.pool, category_type.key())
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    // --- Statuses ---

    async fn find_status(&self, id: StatusId) -> CoreResult<Option<Status>> {
        let row = StatusRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Status::from))
    }

    async fn find_status_by_name(&self, name: &str) -> CoreResult<Option<Status>> {
        let row = StatusRepo::find_by_name(&self.pool, name)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Status::from))
    }

    async fn find_status_relation(&self, kind: EntityKind) -> CoreResult<Option<Vec<StatusId>>> {
        StatusRepo::relation_members(&self.pool, kind.key())
            .await
            .map_err(map_db_error)
    }

    // --- Characters ---

    async fn insert_character(&self, input: &NewCharacter) -> CoreResult<Character> {
        let row = CharacterRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn find_character(
        &self,
        id: DbId,
        status: Option<StatusId>,
    ) -> CoreResult<Option<Character>> {
        let row = CharacterRepo::find_by_id(&self.pool, id, status)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Character::from))
    }

    async fn find_character_by_identity(
        &self,
        identity: &CharacterIdentity,
        status: StatusId,
    ) -> CoreResult<Option<Character>> {
        let row = CharacterRepo::find_by_identity(&self.pool, identity, status)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Character::from))
    }

    async fn update_character(
        &self,
        id: DbId,
        status: StatusId,
        changes: &CharacterChanges,
    ) -> CoreResult<Option<Character>> {
        let row = CharacterRepo::update(&self.pool, id, status, changes)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Character::from))
    }

    async fn list_characters(
        &self,
        filter: &CharacterFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Character>, i64)> {
        let rows = CharacterRepo::list(
            &self.pool,
            filter.status_id,
            filter.specie_id,
            window.limit,
            window.offset,
        )
        .await
        .map_err(map_db_error)?;
        let total = CharacterRepo::count(&self.pool, filter.status_id, filter.specie_id)
            .await
            .map_err(map_db_error)?;
        Ok((rows.into_iter().map(Character::from).collect(), total))
    }

    async fn swap_character_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Character>> {
        let row = CharacterRepo::swap_status(&self.pool, id, from, to)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Character::from))
    }

    // --- Episodes ---

    async fn insert_episode(&self, input: &NewEpisode) -> CoreResult<Episode> {
        let row = EpisodeRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)?;
        Episode::try_from(row)
    }

    async fn find_episode(&self, id: DbId, status: Option<StatusId>) -> CoreResult<Option<Episode>> {
        let row = EpisodeRepo::find_by_id(&self.pool, id, status)
            .await
            .map_err(map_db_error)?;
        into_episode(row)
    }

    async fn find_episode_by_name(
        &self,
        name: &str,
        season_id: Option<CategoryId>,
        status: StatusId,
    ) -> CoreResult<Option<Episode>> {
        let row = EpisodeRepo::find_by_name(&self.pool, name, season_id, status)
            .await
            .map_err(map_db_error)?;
        into_episode(row)
    }

    async fn update_episode(
        &self,
        id: DbId,
        status: StatusId,
        changes: &EpisodeChanges,
    ) -> CoreResult<Option<Episode>> {
        let row = EpisodeRepo::update(&self.pool, id, status, changes)
            .await
            .map_err(map_db_error)?;
        into_episode(row)
    }

    async fn list_episodes(
        &self,
        filter: &EpisodeFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Episode>, i64)> {
        let rows = EpisodeRepo::list(
            &self.pool,
            filter.status_id,
            filter.season_id,
            window.limit,
            window.offset,
        )
        .await
        .map_err(map_db_error)?;
        let total = EpisodeRepo::count(&self.pool, filter.status_id, filter.season_id)
            .await
            .map_err(map_db_error)?;
        let episodes = rows
            .into_iter()
            .map(Episode::try_from)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok((episodes, total))
    }

    async fn swap_episode_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Episode>> {
        let row = EpisodeRepo::swap_status(&self.pool, id, from, to)
            .await
            .map_err(map_db_error)?;
        into_episode(row)
    }

    // --- Performances ---

    async fn find_performance(&self, id: DbId) -> CoreResult<Option<Performance>> {
        let row = PerformanceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        row.map(Performance::try_from).transpose()
    }

    async fn load_timeline(&self, episode_id: DbId) -> CoreResult<Timeline> {
        // Revision first: a commit landing between the two reads leaves the
        // snapshot with a stale revision, which the commit CAS then rejects.
        let revision = EpisodeRepo::find_revision(&self.pool, episode_id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CoreError::not_found("Episode", episode_id))?;
        let rows = PerformanceRepo::list_for_episode(&self.pool, episode_id)
            .await
            .map_err(map_db_error)?;
        let entries = into_performances(rows)?
            .iter()
            .map(Performance::placed)
            .collect();
        Ok(Timeline::new(episode_id, revision.revision, entries))
    }

    async fn commit_timeline(&self, commit: &TimelineCommit) -> CoreResult<CommitOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut revisions = commit.revisions.clone();
        revisions.sort_by_key(|r| r.episode_id);
        for rev in &revisions {
            let duration = secs_to_db(rev.duration, "duration")?;
            let bumped =
                EpisodeRepo::bump_revision(&mut *tx, rev.episode_id, rev.expected_revision, duration)
                    .await
                    .map_err(map_db_error)?;
            if !bumped {
                tracing::debug!(episode_id = rev.episode_id, "Episode revision moved, rolling back");
                return Err(CoreError::ConcurrentWrite {
                    episode_id: rev.episode_id,
                });
            }
        }

        let mut outcome = CommitOutcome::default();
        for op in &commit.ops {
            match op {
                PerformanceOp::Insert(input) => {
                    let row = PerformanceRepo::insert(&mut *tx, &write_columns(input)?)
                        .await
                        .map_err(map_db_error)?;
                    outcome.written.push(Performance::try_from(row)?);
                }
                PerformanceOp::Replace { id, with } => {
                    let row = PerformanceRepo::replace(&mut *tx, *id, &write_columns(with)?)
                        .await
                        .map_err(map_db_error)?
                        .ok_or_else(|| CoreError::not_found("Performance", id))?;
                    outcome.written.push(Performance::try_from(row)?);
                }
                PerformanceOp::Delete { id } => {
                    let deleted = PerformanceRepo::delete(&mut *tx, *id)
                        .await
                        .map_err(map_db_error)?;
                    if deleted == 0 {
                        return Err(CoreError::not_found("Performance", id));
                    }
                    outcome.deleted += deleted;
                }
                PerformanceOp::DeleteForCharacter {
                    episode_id,
                    character_id,
                } => {
                    outcome.deleted +=
                        PerformanceRepo::delete_for_character(&mut *tx, *episode_id, *character_id)
                            .await
                            .map_err(map_db_error)?;
                }
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        tracing::debug!(
            episodes = revisions.len(),
            written = outcome.written.len(),
            deleted = outcome.deleted,
            "Timeline committed"
        );
        Ok(outcome)
    }

    async fn list_performances(
        &self,
        filter: &PerformanceFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Performance>, i64)> {
        let rows = PerformanceRepo::list(&self.pool, filter, window.limit, window.offset)
            .await
            .map_err(map_db_error)?;
        let total = PerformanceRepo::count(&self.pool, filter)
            .await
            .map_err(map_db_error)?;
        Ok((into_performances(rows)?, total))
    }
}

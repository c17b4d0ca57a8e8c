//! Performance writes and listings.
//!
//! Every write runs the same sequence against one episode snapshot:
//!
//! 1. parse the interval (`Format` / `Range`),
//! 2. gate the episode, then the character, on ACTIVE,
//! 3. validate placement under the configured [`PlacementPolicy`],
//! 4. recompute the duration on the post-write timeline,
//! 5. commit intervals and duration together against the snapshot revision.
//!
//! A lost revision race restarts the sequence once from a fresh snapshot; a
//! second loss surfaces as `ConcurrentWrite`.
//!
//! [`PlacementPolicy`]: crate::placement::PlacementPolicy

use std::future::Future;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Catalog, NamedRef};
use crate::category::CategoryType;
use crate::completeness::CompletenessReport;
use crate::error::{CoreError, CoreResult};
use crate::interval::{IntervalInput, TimeInterval};
use crate::lifecycle::LifecycleStatus;
use crate::model::{
    CommitOutcome, EpisodeRevision, NewPerformance, Performance, PerformanceFilter,
    PerformanceOp, TimelineCommit,
};
use crate::pagination::Page;
use crate::placement::{
    compute_duration, validate_detachment, validate_placement, validate_replacement,
    PlacedInterval, Timeline,
};
use crate::types::{DbId, Timestamp};

/// Attempts per write before a revision race is reported.
pub const MAX_COMMIT_ATTEMPTS: u32 = 2;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePerformance {
    #[validate(range(min = 1))]
    pub episode_id: DbId,
    #[validate(range(min = 1))]
    pub character_id: DbId,
    pub interval: IntervalInput,
}

/// Partial edit; the stored record is replaced wholesale with the merge.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePerformance {
    #[validate(range(min = 1))]
    pub episode_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub character_id: Option<DbId>,
    pub interval: Option<IntervalInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceView {
    pub id: DbId,
    pub episode: NamedRef,
    pub character: NamedRef,
    pub interval: TimeInterval,
    /// Seconds on screen.
    pub length: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of removing a character from an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterRemoval {
    pub episode_id: DbId,
    pub character_id: DbId,
    pub deleted: u64,
    pub duration: u32,
}

/// Optional character filters shared by the episode listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterScope {
    pub character_id: Option<DbId>,
    pub character_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// Run `attempt` until it succeeds, fails with anything other than
/// `ConcurrentWrite`, or [`MAX_COMMIT_ATTEMPTS`] is reached.
pub async fn retry_on_concurrent_write<T, F, Fut>(
    operation: &'static str,
    mut attempt: F,
) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Err(CoreError::ConcurrentWrite { episode_id }) if tries < MAX_COMMIT_ATTEMPTS => {
                tracing::warn!(
                    episode_id,
                    operation,
                    attempt = tries,
                    "Episode timeline changed during write, retrying on a fresh snapshot"
                );
                tries += 1;
            }
            other => return other,
        }
    }
}

fn single_revision(timeline: &Timeline, after: &Timeline) -> Vec<EpisodeRevision> {
    vec![EpisodeRevision {
        episode_id: timeline.episode_id,
        expected_revision: timeline.revision,
        duration: after.duration(),
    }]
}

fn first_written(outcome: CommitOutcome) -> CoreResult<Performance> {
    outcome
        .written
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::Internal("timeline commit wrote no performance".to_string()))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Catalog {
    async fn performance_view(&self, performance: Performance) -> CoreResult<PerformanceView> {
        let episode = self
            .store
            .find_episode(performance.episode_id, None)
            .await?
            .ok_or_else(|| CoreError::not_found("Episode", performance.episode_id))?;
        let character = self
            .store
            .find_character(performance.character_id, None)
            .await?
            .ok_or_else(|| CoreError::not_found("Character", performance.character_id))?;
        Ok(PerformanceView {
            id: performance.id,
            episode: NamedRef {
                id: episode.id,
                name: episode.name,
            },
            character: NamedRef {
                id: character.id,
                name: character.name,
            },
            interval: performance.interval,
            length: performance.interval.duration_secs(),
            created_at: performance.created_at,
            updated_at: performance.updated_at,
        })
    }

    async fn require_performance(&self, id: DbId) -> CoreResult<Performance> {
        self.store
            .find_performance(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Performance", id))
    }

    // -- create ---------------------------------------------------------------

    pub async fn create_performance(
        &self,
        input: CreatePerformance,
    ) -> CoreResult<PerformanceView> {
        input.validate()?;
        let new = NewPerformance {
            episode_id: input.episode_id,
            character_id: input.character_id,
            interval: TimeInterval::parse(&input.interval)?,
        };

        let performance =
            retry_on_concurrent_write("create_performance", || self.try_create(new)).await?;
        tracing::info!(
            performance_id = performance.id,
            episode_id = performance.episode_id,
            character_id = performance.character_id,
            interval = %performance.interval,
            "Performance created"
        );
        self.performance_view(performance).await
    }

    async fn try_create(&self, new: NewPerformance) -> CoreResult<Performance> {
        let gate = self.gate();
        gate.require_episode(new.episode_id, LifecycleStatus::Active)
            .await?;
        gate.require_character(new.character_id, LifecycleStatus::Active)
            .await?;

        let timeline = self.store.load_timeline(new.episode_id).await?;
        validate_placement(
            self.settings.placement,
            &timeline,
            new.character_id,
            new.interval,
        )?;

        let duration = compute_duration(
            timeline
                .intervals()
                .into_iter()
                .chain(std::iter::once(new.interval)),
        );
        let commit = TimelineCommit {
            revisions: vec![EpisodeRevision {
                episode_id: timeline.episode_id,
                expected_revision: timeline.revision,
                duration,
            }],
            ops: vec![PerformanceOp::Insert(new)],
        };
        first_written(self.store.commit_timeline(&commit).await?)
    }

    // -- update ---------------------------------------------------------------

    pub async fn update_performance(
        &self,
        id: DbId,
        input: UpdatePerformance,
    ) -> CoreResult<PerformanceView> {
        input.validate()?;
        let interval = input
            .interval
            .as_ref()
            .map(TimeInterval::parse)
            .transpose()?;

        let performance = retry_on_concurrent_write("update_performance", || {
            self.try_update(id, input.episode_id, input.character_id, interval)
        })
        .await?;
        tracing::info!(
            performance_id = id,
            episode_id = performance.episode_id,
            character_id = performance.character_id,
            interval = %performance.interval,
            "Performance updated"
        );
        self.performance_view(performance).await
    }

    async fn try_update(
        &self,
        id: DbId,
        episode_id: Option<DbId>,
        character_id: Option<DbId>,
        interval: Option<TimeInterval>,
    ) -> CoreResult<Performance> {
        let current = self.require_performance(id).await?;
        let target = NewPerformance {
            episode_id: episode_id.unwrap_or(current.episode_id),
            character_id: character_id.unwrap_or(current.character_id),
            interval: interval.unwrap_or(current.interval),
        };
        let placed = PlacedInterval {
            performance_id: id,
            character_id: target.character_id,
            interval: target.interval,
        };
        let moving = target.episode_id != current.episode_id;

        let gate = self.gate();
        gate.require_episode(current.episode_id, LifecycleStatus::Active)
            .await?;
        if moving {
            gate.require_episode(target.episode_id, LifecycleStatus::Active)
                .await?;
        }
        gate.require_character(target.character_id, LifecycleStatus::Active)
            .await?;

        let source = self.store.load_timeline(current.episode_id).await?;
        let revisions = if moving {
            validate_detachment(self.settings.placement, &source, id)?;
            let destination = self.store.load_timeline(target.episode_id).await?;
            validate_placement(
                self.settings.placement,
                &destination,
                target.character_id,
                target.interval,
            )?;
            let mut revisions = single_revision(&source, &source.with_removed(id));
            revisions.extend(single_revision(
                &destination,
                &destination.with_inserted(placed),
            ));
            revisions
        } else {
            validate_replacement(self.settings.placement, &source, placed)?;
            single_revision(&source, &source.with_replaced(placed))
        };

        let commit = TimelineCommit {
            revisions,
            ops: vec![PerformanceOp::Replace { id, with: target }],
        };
        first_written(self.store.commit_timeline(&commit).await?)
    }

    // -- delete ---------------------------------------------------------------

    /// Physically delete a performance and recompute its episode's duration.
    pub async fn delete_performance(&self, id: DbId) -> CoreResult<PerformanceView> {
        let (deleted, view) =
            retry_on_concurrent_write("delete_performance", || self.try_delete(id)).await?;
        tracing::info!(
            performance_id = id,
            episode_id = deleted.episode_id,
            "Performance deleted"
        );
        Ok(view)
    }

    async fn try_delete(&self, id: DbId) -> CoreResult<(Performance, PerformanceView)> {
        let current = self.require_performance(id).await?;
        self.gate()
            .require_episode(current.episode_id, LifecycleStatus::Active)
            .await?;
        let view = self.performance_view(current.clone()).await?;

        let timeline = self.store.load_timeline(current.episode_id).await?;
        let commit = TimelineCommit {
            revisions: single_revision(&timeline, &timeline.with_removed(id)),
            ops: vec![PerformanceOp::Delete { id }],
        };
        self.store.commit_timeline(&commit).await?;
        Ok((current, view))
    }

    /// Delete every performance of `character_id` in `episode_id`.
    ///
    /// The character may be in any status; the episode must be active.
    pub async fn remove_character_from_episode(
        &self,
        character_id: DbId,
        episode_id: DbId,
    ) -> CoreResult<CharacterRemoval> {
        let removal = retry_on_concurrent_write("remove_character_from_episode", || {
            self.try_remove_character(character_id, episode_id)
        })
        .await?;
        tracing::info!(
            episode_id,
            character_id,
            deleted = removal.deleted,
            duration = removal.duration,
            "Character removed from episode"
        );
        Ok(removal)
    }

    async fn try_remove_character(
        &self,
        character_id: DbId,
        episode_id: DbId,
    ) -> CoreResult<CharacterRemoval> {
        self.gate()
            .require_episode(episode_id, LifecycleStatus::Active)
            .await?;
        self.store
            .find_character(character_id, None)
            .await?
            .ok_or_else(|| CoreError::not_found("Character", character_id))?;

        let timeline = self.store.load_timeline(episode_id).await?;
        let after = timeline.without_character(character_id);
        let commit = TimelineCommit {
            revisions: single_revision(&timeline, &after),
            ops: vec![PerformanceOp::DeleteForCharacter {
                episode_id,
                character_id,
            }],
        };
        let outcome = self.store.commit_timeline(&commit).await?;
        Ok(CharacterRemoval {
            episode_id,
            character_id,
            deleted: outcome.deleted,
            duration: after.duration(),
        })
    }

    // -- completeness ---------------------------------------------------------

    /// Coverage report for an episode in any status. Read-only.
    pub async fn completeness(&self, episode_id: DbId) -> CoreResult<CompletenessReport> {
        let timeline = self.store.load_timeline(episode_id).await?;
        Ok(CompletenessReport::evaluate(
            episode_id,
            &timeline.intervals(),
        ))
    }

    pub async fn is_episode_valid(&self, episode_id: DbId) -> CoreResult<bool> {
        Ok(self.completeness(episode_id).await?.is_complete)
    }

    // -- listings -------------------------------------------------------------

    async fn list_performances(
        &self,
        page: Option<i64>,
        filter: PerformanceFilter,
    ) -> CoreResult<Page<PerformanceView>> {
        let (page, window) = self.window(page);
        let (rows, total) = self.store.list_performances(&filter, window).await?;
        tracing::debug!(page, total, ?filter, "Listed performances");

        let mut results = Vec::with_capacity(rows.len());
        for performance in rows {
            results.push(self.performance_view(performance).await?);
        }
        Ok(self.page(page, results, total))
    }

    async fn scoped_filter(&self, scope: &CharacterScope) -> CoreResult<PerformanceFilter> {
        let character_status_id = match scope.character_status.as_deref() {
            Some(name) => Some(self.gate().status_by_name(name).await?.id),
            None => None,
        };
        Ok(PerformanceFilter {
            character_id: scope.character_id,
            character_status_id,
            ..Default::default()
        })
    }

    /// Performances of an active episode in start order.
    pub async fn list_by_episode(
        &self,
        episode_id: DbId,
        page: Option<i64>,
        scope: &CharacterScope,
    ) -> CoreResult<Page<PerformanceView>> {
        self.gate()
            .require_episode(episode_id, LifecycleStatus::Active)
            .await?;
        let filter = PerformanceFilter {
            episode_id: Some(episode_id),
            ..self.scoped_filter(scope).await?
        };
        self.list_performances(page, filter).await
    }

    /// Performances of every episode currently in `status`.
    pub async fn list_by_episode_status(
        &self,
        status: &str,
        page: Option<i64>,
        scope: &CharacterScope,
    ) -> CoreResult<Page<PerformanceView>> {
        let status = self.gate().status_by_name(status).await?;
        let filter = PerformanceFilter {
            episode_status_id: Some(status.id),
            ..self.scoped_filter(scope).await?
        };
        self.list_performances(page, filter).await
    }

    /// An active character's performances across the active episodes of a
    /// season.
    pub async fn list_by_character_and_season(
        &self,
        character_id: DbId,
        season: &str,
        page: Option<i64>,
    ) -> CoreResult<Page<PerformanceView>> {
        let gate = self.gate();
        gate.require_character(character_id, LifecycleStatus::Active)
            .await?;
        let season = self.categories().resolve(season, CategoryType::Seasons).await?;
        let active = gate.status_record(LifecycleStatus::Active).await?;
        let filter = PerformanceFilter {
            character_id: Some(character_id),
            season_id: Some(season.id()),
            episode_status_id: Some(active.id),
            ..Default::default()
        };
        self.list_performances(page, filter).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::catalog::test_support::{catalog, catalog_with, character, episode};
    use crate::placement::PlacementPolicy;

    async fn setup(catalog: &Catalog) -> (DbId, DbId) {
        let ep = catalog
            .create_episode(episode("Pilot", Some("season 1")))
            .await
            .unwrap();
        let ch = catalog
            .create_character(character("Rick Sanchez", "human"))
            .await
            .unwrap();
        (ep.id, ch.id)
    }

    fn perf(episode_id: DbId, character_id: DbId, start: &str, end: &str) -> CreatePerformance {
        CreatePerformance {
            episode_id,
            character_id,
            interval: IntervalInput::new(start, end),
        }
    }

    async fn duration_of(catalog: &Catalog, episode_id: DbId) -> u32 {
        catalog.get_episode(episode_id).await.unwrap().duration
    }

    // -- scenarios ------------------------------------------------------------

    #[tokio::test]
    async fn empty_episode_is_incomplete_with_zero_duration() {
        let catalog = catalog();
        let (episode_id, _) = setup(&catalog).await;
        assert!(!catalog.is_episode_valid(episode_id).await.unwrap());
        assert_eq!(duration_of(&catalog, episode_id).await, 0);
    }

    #[tokio::test]
    async fn five_contiguous_segments_complete_the_episode() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        for (start, end) in [
            ("00:00", "12:00"),
            ("12:00", "24:00"),
            ("24:00", "36:00"),
            ("36:00", "48:00"),
            ("48:00", "60:00"),
        ] {
            catalog
                .create_performance(perf(episode_id, character_id, start, end))
                .await
                .unwrap();
        }
        let report = catalog.completeness(episode_id).await.unwrap();
        assert!(report.is_complete);
        assert_eq!(report.performance_count, 5);
        assert_eq!(duration_of(&catalog, episode_id).await, 3_600);
        assert!(catalog.is_episode_valid(episode_id).await.unwrap());
    }

    #[tokio::test]
    async fn overlapping_segment_is_rejected_and_duration_kept() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();
        assert_matches!(
            catalog
                .create_performance(perf(episode_id, character_id, "05:00", "15:00"))
                .await,
            Err(CoreError::Overlap(_))
        );
        assert_eq!(duration_of(&catalog, episode_id).await, 600);
    }

    #[tokio::test]
    async fn suspended_character_keeps_performances() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();

        catalog
            .transition_character(character_id, "Suspended")
            .await
            .unwrap();
        assert_matches!(
            catalog.get_character(character_id).await,
            Err(CoreError::NotFound { .. })
        );

        let page = catalog
            .list_by_episode(episode_id, None, &CharacterScope::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].character.id, character_id);

        // But no new appearance can be added for it.
        assert_matches!(
            catalog
                .create_performance(perf(episode_id, character_id, "10:00", "20:00"))
                .await,
            Err(CoreError::NotFound { entity: "Character", .. })
        );
    }

    // -- gating ---------------------------------------------------------------

    #[tokio::test]
    async fn cancelled_episode_rejects_writes() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog.remove_episode(episode_id).await.unwrap();
        assert_matches!(
            catalog
                .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
                .await,
            Err(CoreError::NotFound { entity: "Episode", .. })
        );
    }

    #[tokio::test]
    async fn interval_errors_come_before_the_gate() {
        let catalog = catalog();
        assert_matches!(
            catalog.create_performance(perf(99, 99, "0a:00", "10:00")).await,
            Err(CoreError::Format(_))
        );
        assert_matches!(
            catalog.create_performance(perf(99, 99, "00:00", "60:01")).await,
            Err(CoreError::Range(_))
        );
        assert_matches!(
            catalog.create_performance(perf(99, 99, "00:00", "10:00")).await,
            Err(CoreError::NotFound { entity: "Episode", .. })
        );
    }

    #[tokio::test]
    async fn gap_is_rejected_under_contiguity() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        assert_matches!(
            catalog
                .create_performance(perf(episode_id, character_id, "00:30", "10:00"))
                .await,
            Err(CoreError::Gap(_))
        );
    }

    // -- update / delete ------------------------------------------------------

    #[tokio::test]
    async fn update_replaces_interval_and_recomputes_duration() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();
        let second = catalog
            .create_performance(perf(episode_id, character_id, "10:00", "20:00"))
            .await
            .unwrap();

        let updated = catalog
            .update_performance(
                second.id,
                UpdatePerformance {
                    interval: Some(IntervalInput::new("10:00", "15:00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.interval.end(), 900);
        assert_eq!(duration_of(&catalog, episode_id).await, 900);
    }

    #[tokio::test]
    async fn update_to_another_episode_recomputes_both() {
        let catalog = catalog();
        let (first_episode, character_id) = setup(&catalog).await;
        let second_episode = catalog
            .create_episode(episode("Lawnmower Dog", Some("season 1")))
            .await
            .unwrap()
            .id;
        let performance = catalog
            .create_performance(perf(first_episode, character_id, "00:00", "10:00"))
            .await
            .unwrap();

        catalog
            .update_performance(
                performance.id,
                UpdatePerformance {
                    episode_id: Some(second_episode),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(duration_of(&catalog, first_episode).await, 0);
        assert_eq!(duration_of(&catalog, second_episode).await, 600);
    }

    async fn two_segments(catalog: &Catalog) -> (DbId, DbId, DbId, DbId) {
        let (episode_id, character_id) = setup(catalog).await;
        let first = catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();
        let second = catalog
            .create_performance(perf(episode_id, character_id, "10:00", "20:00"))
            .await
            .unwrap();
        (episode_id, character_id, first.id, second.id)
    }

    #[tokio::test]
    async fn inner_segment_can_change_character() {
        let catalog = catalog();
        let (episode_id, _, first, _) = two_segments(&catalog).await;
        let morty = catalog
            .create_character(character("Morty Smith", "human"))
            .await
            .unwrap();

        let updated = catalog
            .update_performance(
                first,
                UpdatePerformance {
                    character_id: Some(morty.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.character.id, morty.id);
        assert_eq!(updated.interval.start(), 0);
        assert_eq!(duration_of(&catalog, episode_id).await, 1_200);
    }

    #[tokio::test]
    async fn inner_segment_cannot_move_to_the_end() {
        let catalog = catalog();
        let (episode_id, _, first, _) = two_segments(&catalog).await;

        assert_matches!(
            catalog
                .update_performance(
                    first,
                    UpdatePerformance {
                        interval: Some(IntervalInput::new("20:00", "30:00")),
                        ..Default::default()
                    },
                )
                .await,
            Err(CoreError::Gap(_))
        );
        let report = catalog.completeness(episode_id).await.unwrap();
        assert_eq!(report.covered_until, 1_200);
        assert_eq!(duration_of(&catalog, episode_id).await, 1_200);
    }

    #[tokio::test]
    async fn inner_segment_cannot_leave_for_another_episode() {
        let catalog = catalog();
        let (episode_id, _, first, second) = two_segments(&catalog).await;
        let other = catalog
            .create_episode(episode("Lawnmower Dog", Some("season 1")))
            .await
            .unwrap()
            .id;
        let move_to_other = || UpdatePerformance {
            episode_id: Some(other),
            ..Default::default()
        };

        assert_matches!(
            catalog.update_performance(first, move_to_other()).await,
            Err(CoreError::Gap(_))
        );
        // The last segment fails only on the empty destination's start rule.
        assert_matches!(
            catalog.update_performance(second, move_to_other()).await,
            Err(CoreError::Gap(_))
        );
        assert_eq!(duration_of(&catalog, episode_id).await, 1_200);
        assert_eq!(duration_of(&catalog, other).await, 0);
    }

    #[tokio::test]
    async fn forward_inner_segment_is_checked_against_neighbours() {
        let catalog = catalog_with(PlacementPolicy::ForwardPerCharacter);
        let (episode_id, _, first, _) = two_segments(&catalog).await;

        let updated = catalog
            .update_performance(
                first,
                UpdatePerformance {
                    interval: Some(IntervalInput::new("02:00", "08:00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.interval.start(), 120);

        assert_matches!(
            catalog
                .update_performance(
                    first,
                    UpdatePerformance {
                        interval: Some(IntervalInput::new("05:00", "12:00")),
                        ..Default::default()
                    },
                )
                .await,
            Err(CoreError::Overlap(_))
        );
        assert_eq!(duration_of(&catalog, episode_id).await, 1_200);
    }

    #[tokio::test]
    async fn forward_inner_segment_can_change_character() {
        let catalog = catalog_with(PlacementPolicy::ForwardPerCharacter);
        let (_, _, first, _) = two_segments(&catalog).await;
        let morty = catalog
            .create_character(character("Morty Smith", "human"))
            .await
            .unwrap();

        let updated = catalog
            .update_performance(
                first,
                UpdatePerformance {
                    character_id: Some(morty.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.character.id, morty.id);
    }

    #[tokio::test]
    async fn delete_is_physical_and_recomputes_duration() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();
        let last = catalog
            .create_performance(perf(episode_id, character_id, "10:00", "25:00"))
            .await
            .unwrap();

        catalog.delete_performance(last.id).await.unwrap();
        assert_eq!(duration_of(&catalog, episode_id).await, 600);
        assert_matches!(
            catalog.delete_performance(last.id).await,
            Err(CoreError::NotFound { entity: "Performance", .. })
        );
    }

    #[tokio::test]
    async fn removing_a_character_cascades() {
        let catalog = catalog();
        let (episode_id, rick) = setup(&catalog).await;
        let morty = catalog
            .create_character(character("Morty Smith", "human"))
            .await
            .unwrap()
            .id;
        for (who, start, end) in [
            (rick, "00:00", "10:00"),
            (morty, "10:00", "20:00"),
            (rick, "20:00", "30:00"),
        ] {
            catalog
                .create_performance(perf(episode_id, who, start, end))
                .await
                .unwrap();
        }

        let removal = catalog
            .remove_character_from_episode(rick, episode_id)
            .await
            .unwrap();
        assert_eq!(removal.deleted, 2);
        assert_eq!(removal.duration, 1_200);
        assert_eq!(duration_of(&catalog, episode_id).await, 1_200);
    }

    // -- listings -------------------------------------------------------------

    #[tokio::test]
    async fn listing_is_start_ordered() {
        let catalog = catalog_with(PlacementPolicy::ForwardPerCharacter);
        let (episode_id, rick) = setup(&catalog).await;
        let morty = catalog
            .create_character(character("Morty Smith", "human"))
            .await
            .unwrap()
            .id;
        catalog
            .create_performance(perf(episode_id, rick, "30:00", "40:00"))
            .await
            .unwrap();
        catalog
            .create_performance(perf(episode_id, morty, "05:00", "10:00"))
            .await
            .unwrap();
        catalog
            .create_performance(perf(episode_id, morty, "12:00", "15:00"))
            .await
            .unwrap();

        let page = catalog
            .list_by_episode(episode_id, None, &CharacterScope::default())
            .await
            .unwrap();
        let starts: Vec<u32> = page.results.iter().map(|p| p.interval.start()).collect();
        assert_eq!(starts, vec![300, 720, 1_800]);

        let only_morty = catalog
            .list_by_episode(
                episode_id,
                None,
                &CharacterScope {
                    character_id: Some(morty),
                    character_status: Some("active".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(only_morty.total, 2);
    }

    #[tokio::test]
    async fn unknown_status_filter_is_not_found() {
        let catalog = catalog();
        assert_matches!(
            catalog
                .list_by_episode_status("archived", None, &CharacterScope::default())
                .await,
            Err(CoreError::NotFound { entity: "Status", .. })
        );
    }

    #[tokio::test]
    async fn lists_by_character_and_season() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        catalog
            .create_performance(perf(episode_id, character_id, "00:00", "10:00"))
            .await
            .unwrap();

        let season_one = catalog
            .list_by_character_and_season(character_id, "Season 1", None)
            .await
            .unwrap();
        assert_eq!(season_one.total, 1);

        let season_two = catalog
            .list_by_character_and_season(character_id, "season 2", None)
            .await
            .unwrap();
        assert_eq!(season_two.total, 0);

        assert_matches!(
            catalog
                .list_by_character_and_season(character_id, "season 42", None)
                .await,
            Err(CoreError::NotFound { entity: "Season", .. })
        );
    }

    // -- concurrency ----------------------------------------------------------

    #[tokio::test]
    async fn racing_identical_creates_admit_one() {
        let catalog = catalog();
        let (episode_id, character_id) = setup(&catalog).await;
        let (a, b) = tokio::join!(
            catalog.create_performance(perf(episode_id, character_id, "00:00", "10:00")),
            catalog.create_performance(perf(episode_id, character_id, "00:00", "10:00")),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let report = catalog.completeness(episode_id).await.unwrap();
        assert_eq!(report.performance_count, 1);
    }

    #[tokio::test]
    async fn retry_runs_once_more_after_a_lost_race() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_on_concurrent_write("test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CoreError::ConcurrentWrite { episode_id: 1 })
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_lost_race_is_reported() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: CoreResult<()> = retry_on_concurrent_write("test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::ConcurrentWrite { episode_id: 1 })
        })
        .await;
        assert_matches!(result, Err(CoreError::ConcurrentWrite { episode_id: 1 }));
        assert_eq!(counter.load(Ordering::SeqCst), MAX_COMMIT_ATTEMPTS);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: CoreResult<()> = retry_on_concurrent_write("test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::Overlap("taken".to_string()))
        })
        .await;
        assert_matches!(result, Err(CoreError::Overlap(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

//! In-memory [`CatalogStore`] for tests and database-less runs.
//!
//! All state lives behind one `RwLock`, so every trait method (including
//! [`CatalogStore::commit_timeline`]) is atomic with respect to the others.
//! The lock is never held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::CatalogStore;
use crate::category::{Category, CategoryId, CategoryType};
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::{EntityKind, LifecycleStatus, Status, StatusId};
use crate::model::{
    Character, CharacterChanges, CharacterFilter, CharacterIdentity, CommitOutcome, Episode,
    EpisodeChanges, EpisodeFilter, NewCharacter, NewEpisode, NewPerformance, Performance,
    PerformanceFilter, PerformanceOp, TimelineCommit,
};
use crate::pagination::PageWindow;
use crate::placement::Timeline;
use crate::types::DbId;

/// Seasons registered by [`MemoryStore::seeded`].
pub const SEED_SEASONS: &[&str] = &["SEASON 1", "SEASON 2", "SEASON 3", "SEASON 4", "SEASON 5"];

/// Species registered by [`MemoryStore::seeded`].
pub const SEED_SPECIES: &[&str] = &[
    "HUMAN",
    "ALIEN",
    "HUMANOID",
    "ROBOT",
    "ANIMAL",
    "MYTHOLOGICAL CREATURE",
    "CRONENBERG",
    "DISEASE",
    "POOPYBUTTHOLE",
    "UNKNOWN",
];

#[derive(Debug, Default)]
struct Sequences {
    category: CategoryId,
    status: StatusId,
    character: DbId,
    episode: DbId,
    performance: DbId,
}

#[derive(Debug, Default)]
struct Inner {
    seq: Sequences,
    categories: BTreeMap<CategoryId, Category>,
    category_relations: HashMap<CategoryType, Vec<CategoryId>>,
    statuses: BTreeMap<StatusId, Status>,
    status_relations: HashMap<EntityKind, Vec<StatusId>>,
    characters: BTreeMap<DbId, Character>,
    episodes: BTreeMap<DbId, Episode>,
    performances: BTreeMap<DbId, Performance>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

fn poison_err<T>(_: PoisonError<T>) -> CoreError {
    CoreError::Internal("memory store lock poisoned".to_string())
}

fn page<T>(items: Vec<T>, window: PageWindow) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let results = items
        .into_iter()
        .skip(window.offset.max(0) as usize)
        .take(window.limit.max(0) as usize)
        .collect();
    (results, total)
}

impl Inner {
    fn add_category(&mut self, name: &str) -> Category {
        self.seq.category += 1;
        let category = Category {
            id: self.seq.category,
            name: name.to_string(),
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    fn add_status(&mut self, status: LifecycleStatus) -> StatusId {
        self.seq.status += 1;
        let id = self.seq.status;
        self.statuses.insert(
            id,
            Status {
                id,
                name: status.name().to_string(),
            },
        );
        id
    }

    fn is_active(&self, status_id: StatusId) -> bool {
        self.statuses
            .get(&status_id)
            .is_some_and(|s| s.name == LifecycleStatus::Active.name())
    }

    /// Same rule as the `uq_characters_active_identity` index.
    fn check_character_identity(
        &self,
        identity: &CharacterIdentity,
        status_id: StatusId,
        except: Option<DbId>,
    ) -> CoreResult<()> {
        if !self.is_active(status_id) {
            return Ok(());
        }
        let taken = self.characters.values().any(|c| {
            Some(c.id) != except && c.status_id == status_id && c.identity() == *identity
        });
        if taken {
            return Err(CoreError::Conflict(
                "Character with the same name, specie and type already exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Same rule as the `uq_episodes_active_name` index.
    fn check_episode_name(
        &self,
        name: &str,
        season_id: Option<CategoryId>,
        status_id: StatusId,
        except: Option<DbId>,
    ) -> CoreResult<()> {
        if !self.is_active(status_id) {
            return Ok(());
        }
        let taken = self.episodes.values().any(|e| {
            Some(e.id) != except
                && e.status_id == status_id
                && e.season_id == season_id
                && e.name == name
        });
        if taken {
            return Err(CoreError::Conflict(
                "Episode with the same name and season already exists".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_performance(&mut self, input: &NewPerformance) -> Performance {
        self.seq.performance += 1;
        let now = Utc::now();
        let performance = Performance {
            id: self.seq.performance,
            episode_id: input.episode_id,
            character_id: input.character_id,
            interval: input.interval,
            created_at: now,
            updated_at: now,
        };
        self.performances
            .insert(performance.id, performance.clone());
        performance
    }

    fn check_commit(&self, commit: &TimelineCommit) -> CoreResult<()> {
        for rev in &commit.revisions {
            let episode = self
                .episodes
                .get(&rev.episode_id)
                .ok_or_else(|| CoreError::not_found("Episode", rev.episode_id))?;
            if episode.revision != rev.expected_revision {
                return Err(CoreError::ConcurrentWrite {
                    episode_id: rev.episode_id,
                });
            }
        }
        for op in &commit.ops {
            if let PerformanceOp::Replace { id, .. } | PerformanceOp::Delete { id } = op {
                if !self.performances.contains_key(id) {
                    return Err(CoreError::not_found("Performance", id));
                }
            }
        }
        Ok(())
    }
}

impl MemoryStore {
    /// Empty store with no reference data registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the statuses, status relations and categories the
    /// SQL seed migration installs.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();

        let active = inner.add_status(LifecycleStatus::Active);
        let suspended = inner.add_status(LifecycleStatus::Suspended);
        let cancelled = inner.add_status(LifecycleStatus::Cancelled);
        inner
            .status_relations
            .insert(EntityKind::Character, vec![active, suspended]);
        inner
            .status_relations
            .insert(EntityKind::Episode, vec![active, cancelled]);

        for (category_type, names) in [
            (CategoryType::Seasons, SEED_SEASONS),
            (CategoryType::Species, SEED_SPECIES),
        ] {
            let ids = names.iter().map(|n| inner.add_category(n).id).collect();
            inner.category_relations.insert(category_type, ids);
        }

        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(poison_err)
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(poison_err)
    }

    /// Number of stored performances across all episodes.
    pub fn performance_count(&self) -> CoreResult<usize> {
        Ok(self.read()?.performances.len())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn health_check(&self) -> CoreResult<()> {
        self.read().map(|_| ())
    }

    // --- Categories ---

    async fn find_category(&self, id: CategoryId) -> CoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> CoreResult<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn insert_category(&self, name: &str) -> CoreResult<Category> {
        let mut inner = self.write()?;
        if inner.categories.values().any(|c| c.name == name) {
            return Err(CoreError::Conflict(format!("Category {name} already exists")));
        }
        Ok(inner.add_category(name))
    }

    async fn category_relation_exists(&self, category_type: CategoryType) -> CoreResult<bool> {
        Ok(self.read()?.category_relations.contains_key(&category_type))
    }

    async fn relation_contains(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<bool> {
        Ok(self
            .read()?
            .category_relations
            .get(&category_type)
            .is_some_and(|ids| ids.contains(&category_id)))
    }

    async fn add_relation_member(
        &self,
        category_type: CategoryType,
        category_id: CategoryId,
    ) -> CoreResult<()> {
        let mut inner = self.write()?;
        if !inner.categories.contains_key(&category_id) {
            return Err(CoreError::not_found("Category", category_id));
        }
        let members = inner
            .category_relations
            .get_mut(&category_type)
            .ok_or_else(|| CoreError::not_found("CategoryRelation", category_type.key()))?;
        if !members.contains(&category_id) {
            members.push(category_id);
        }
        Ok(())
    }

    async fn list_relation_members(&self, category_type: CategoryType) -> CoreResult<Vec<Category>> {
        let inner = self.read()?;
        let members = inner
            .category_relations
            .get(&category_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.categories.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(members)
    }

    // --- Statuses ---

    async fn find_status(&self, id: StatusId) -> CoreResult<Option<Status>> {
        Ok(self.read()?.statuses.get(&id).cloned())
    }

    async fn find_status_by_name(&self, name: &str) -> CoreResult<Option<Status>> {
        Ok(self
            .read()?
            .statuses
            .values()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_status_relation(&self, kind: EntityKind) -> CoreResult<Option<Vec<StatusId>>> {
        Ok(self.read()?.status_relations.get(&kind).cloned())
    }

    // --- Characters ---

    async fn insert_character(&self, input: &NewCharacter) -> CoreResult<Character> {
        let mut inner = self.write()?;
        let identity = CharacterIdentity {
            name: input.name.clone(),
            specie_id: input.specie_id,
            kind: input.kind.clone(),
        };
        inner.check_character_identity(&identity, input.status_id, None)?;
        inner.seq.character += 1;
        let now = Utc::now();
        let character = Character {
            id: inner.seq.character,
            name: input.name.clone(),
            specie_id: input.specie_id,
            kind: input.kind.clone(),
            gender: input.gender.clone(),
            origin: input.origin.clone(),
            location: input.location.clone(),
            image: input.image.clone(),
            url: input.url.clone(),
            status_id: input.status_id,
            created_at: now,
            updated_at: now,
        };
        inner.characters.insert(character.id, character.clone());
        Ok(character)
    }

    async fn find_character(
        &self,
        id: DbId,
        status: Option<StatusId>,
    ) -> CoreResult<Option<Character>> {
        Ok(self
            .read()?
            .characters
            .get(&id)
            .filter(|c| status.map_or(true, |s| c.status_id == s))
            .cloned())
    }

    async fn find_character_by_identity(
        &self,
        identity: &CharacterIdentity,
        status: StatusId,
    ) -> CoreResult<Option<Character>> {
        Ok(self
            .read()?
            .characters
            .values()
            .find(|c| c.status_id == status && c.identity() == *identity)
            .cloned())
    }

    async fn update_character(
        &self,
        id: DbId,
        status: StatusId,
        changes: &CharacterChanges,
    ) -> CoreResult<Option<Character>> {
        let mut inner = self.write()?;
        let Some(mut character) = inner
            .characters
            .get(&id)
            .filter(|c| c.status_id == status)
            .cloned()
        else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            character.name = name.clone();
        }
        if let Some(specie_id) = changes.specie_id {
            character.specie_id = specie_id;
        }
        let optional = [
            (&mut character.kind, &changes.kind),
            (&mut character.gender, &changes.gender),
            (&mut character.origin, &changes.origin),
            (&mut character.location, &changes.location),
            (&mut character.image, &changes.image),
            (&mut character.url, &changes.url),
        ];
        for (field, change) in optional {
            if change.is_some() {
                field.clone_from(change);
            }
        }
        inner.check_character_identity(&character.identity(), status, Some(id))?;
        character.updated_at = Utc::now();
        inner.characters.insert(id, character.clone());
        Ok(Some(character))
    }

    async fn list_characters(
        &self,
        filter: &CharacterFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Character>, i64)> {
        let matching: Vec<Character> = self
            .read()?
            .characters
            .values()
            .filter(|c| c.status_id == filter.status_id)
            .filter(|c| filter.specie_id.map_or(true, |s| c.specie_id == s))
            .cloned()
            .collect();
        Ok(page(matching, window))
    }

    async fn swap_character_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Character>> {
        let mut inner = self.write()?;
        Ok(inner
            .characters
            .get_mut(&id)
            .filter(|c| c.status_id == from)
            .map(|c| {
                c.status_id = to;
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    // --- Episodes ---

    async fn insert_episode(&self, input: &NewEpisode) -> CoreResult<Episode> {
        let mut inner = self.write()?;
        inner.check_episode_name(&input.name, input.season_id, input.status_id, None)?;
        inner.seq.episode += 1;
        let now = Utc::now();
        let episode = Episode {
            id: inner.seq.episode,
            name: input.name.clone(),
            air_date: input.air_date.clone(),
            season_id: input.season_id,
            duration: 0,
            status_id: input.status_id,
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        inner.episodes.insert(episode.id, episode.clone());
        Ok(episode)
    }

    async fn find_episode(&self, id: DbId, status: Option<StatusId>) -> CoreResult<Option<Episode>> {
        Ok(self
            .read()?
            .episodes
            .get(&id)
            .filter(|e| status.map_or(true, |s| e.status_id == s))
            .cloned())
    }

    async fn find_episode_by_name(
        &self,
        name: &str,
        season_id: Option<CategoryId>,
        status: StatusId,
    ) -> CoreResult<Option<Episode>> {
        Ok(self
            .read()?
            .episodes
            .values()
            .find(|e| e.status_id == status && e.season_id == season_id && e.name == name)
            .cloned())
    }

    async fn update_episode(
        &self,
        id: DbId,
        status: StatusId,
        changes: &EpisodeChanges,
    ) -> CoreResult<Option<Episode>> {
        let mut inner = self.write()?;
        let Some(mut episode) = inner
            .episodes
            .get(&id)
            .filter(|e| e.status_id == status)
            .cloned()
        else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            episode.name = name.clone();
        }
        if changes.air_date.is_some() {
            episode.air_date.clone_from(&changes.air_date);
        }
        if changes.season_id.is_some() {
            episode.season_id = changes.season_id;
        }
        inner.check_episode_name(&episode.name, episode.season_id, status, Some(id))?;
        episode.updated_at = Utc::now();
        inner.episodes.insert(id, episode.clone());
        Ok(Some(episode))
    }

    async fn list_episodes(
        &self,
        filter: &EpisodeFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Episode>, i64)> {
        let matching: Vec<Episode> = self
            .read()?
            .episodes
            .values()
            .filter(|e| e.status_id == filter.status_id)
            .filter(|e| filter.season_id.map_or(true, |s| e.season_id == Some(s)))
            .cloned()
            .collect();
        Ok(page(matching, window))
    }

    async fn swap_episode_status(
        &self,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> CoreResult<Option<Episode>> {
        let mut inner = self.write()?;
        Ok(inner
            .episodes
            .get_mut(&id)
            .filter(|e| e.status_id == from)
            .map(|e| {
                e.status_id = to;
                e.updated_at = Utc::now();
                e.clone()
            }))
    }

    // --- Performances ---

    async fn find_performance(&self, id: DbId) -> CoreResult<Option<Performance>> {
        Ok(self.read()?.performances.get(&id).cloned())
    }

    async fn load_timeline(&self, episode_id: DbId) -> CoreResult<Timeline> {
        let inner = self.read()?;
        let episode = inner
            .episodes
            .get(&episode_id)
            .ok_or_else(|| CoreError::not_found("Episode", episode_id))?;
        let entries = inner
            .performances
            .values()
            .filter(|p| p.episode_id == episode_id)
            .map(Performance::placed)
            .collect();
        Ok(Timeline::new(episode_id, episode.revision, entries))
    }

    async fn commit_timeline(&self, commit: &TimelineCommit) -> CoreResult<CommitOutcome> {
        let mut inner = self.write()?;
        inner.check_commit(commit)?;

        let mut outcome = CommitOutcome::default();
        for op in &commit.ops {
            match op {
                PerformanceOp::Insert(input) => {
                    let performance = inner.insert_performance(input);
                    outcome.written.push(performance);
                }
                PerformanceOp::Replace { id, with } => {
                    if let Some(existing) = inner.performances.get_mut(id) {
                        existing.episode_id = with.episode_id;
                        existing.character_id = with.character_id;
                        existing.interval = with.interval;
                        existing.updated_at = Utc::now();
                        outcome.written.push(existing.clone());
                    }
                }
                PerformanceOp::Delete { id } => {
                    if inner.performances.remove(id).is_some() {
                        outcome.deleted += 1;
                    }
                }
                PerformanceOp::DeleteForCharacter {
                    episode_id,
                    character_id,
                } => {
                    let before = inner.performances.len();
                    inner.performances.retain(|_, p| {
                        !(p.episode_id == *episode_id && p.character_id == *character_id)
                    });
                    outcome.deleted += (before - inner.performances.len()) as u64;
                }
            }
        }

        let now = Utc::now();
        for rev in &commit.revisions {
            if let Some(episode) = inner.episodes.get_mut(&rev.episode_id) {
                episode.revision += 1;
                episode.duration = rev.duration;
                episode.updated_at = now;
            }
        }
        Ok(outcome)
    }

    async fn list_performances(
        &self,
        filter: &PerformanceFilter,
        window: PageWindow,
    ) -> CoreResult<(Vec<Performance>, i64)> {
        let inner = self.read()?;
        let mut matching: Vec<Performance> = inner
            .performances
            .values()
            .filter(|p| filter.episode_id.map_or(true, |id| p.episode_id == id))
            .filter(|p| filter.character_id.map_or(true, |id| p.character_id == id))
            .filter(|p| {
                if filter.episode_status_id.is_none() && filter.season_id.is_none() {
                    return true;
                }
                inner.episodes.get(&p.episode_id).is_some_and(|e| {
                    filter.episode_status_id.map_or(true, |s| e.status_id == s)
                        && filter.season_id.map_or(true, |s| e.season_id == Some(s))
                })
            })
            .filter(|p| {
                filter.character_status_id.map_or(true, |s| {
                    inner
                        .characters
                        .get(&p.character_id)
                        .is_some_and(|c| c.status_id == s)
                })
            })
            .cloned()
            .collect();
        matching.sort_by_key(|p| (p.episode_id, p.interval.start(), p.id));
        Ok(page(matching, window))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::interval::TimeInterval;
    use crate::model::EpisodeRevision;

    fn new_episode(name: &str) -> NewEpisode {
        NewEpisode {
            name: name.to_string(),
            air_date: None,
            season_id: None,
            status_id: 1,
        }
    }

    fn insert_op(episode_id: DbId, start: u32, end: u32) -> PerformanceOp {
        PerformanceOp::Insert(NewPerformance {
            episode_id,
            character_id: 1,
            interval: TimeInterval::new(start, end).unwrap(),
        })
    }

    fn new_character(name: &str, status_id: StatusId) -> NewCharacter {
        NewCharacter {
            name: name.to_string(),
            specie_id: 6,
            kind: None,
            gender: None,
            origin: None,
            location: None,
            image: None,
            url: None,
            status_id,
        }
    }

    #[tokio::test]
    async fn seeded_store_has_reference_data() {
        let store = MemoryStore::seeded();
        let active = store.find_status_by_name("active").await.unwrap().unwrap();
        assert_eq!(active.name, "ACTIVE");
        assert_eq!(
            store.find_status_relation(EntityKind::Episode).await.unwrap(),
            Some(vec![1, 3])
        );
        let seasons = store
            .list_relation_members(CategoryType::Seasons)
            .await
            .unwrap();
        assert_eq!(seasons.len(), SEED_SEASONS.len());
        assert_eq!(seasons[0].name, "SEASON 1");
    }

    #[tokio::test]
    async fn commit_bumps_revision_and_duration() {
        let store = MemoryStore::seeded();
        let episode = store.insert_episode(&new_episode("Pilot")).await.unwrap();

        let outcome = store
            .commit_timeline(&TimelineCommit {
                revisions: vec![EpisodeRevision {
                    episode_id: episode.id,
                    expected_revision: 0,
                    duration: 600,
                }],
                ops: vec![insert_op(episode.id, 0, 600)],
            })
            .await
            .unwrap();
        assert_eq!(outcome.written.len(), 1);

        let timeline = store.load_timeline(episode.id).await.unwrap();
        assert_eq!(timeline.revision, 1);
        assert_eq!(timeline.len(), 1);
        let stored = store.find_episode(episode.id, None).await.unwrap().unwrap();
        assert_eq!(stored.duration, 600);
    }

    #[tokio::test]
    async fn stale_revision_writes_nothing() {
        let store = MemoryStore::seeded();
        let episode = store.insert_episode(&new_episode("Pilot")).await.unwrap();
        let stale = TimelineCommit {
            revisions: vec![EpisodeRevision {
                episode_id: episode.id,
                expected_revision: 4,
                duration: 600,
            }],
            ops: vec![insert_op(episode.id, 0, 600)],
        };
        assert_matches!(
            store.commit_timeline(&stale).await,
            Err(CoreError::ConcurrentWrite { episode_id }) if episode_id == episode.id
        );
        assert_eq!(store.performance_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn commit_with_missing_performance_is_rejected_whole() {
        let store = MemoryStore::seeded();
        let episode = store.insert_episode(&new_episode("Pilot")).await.unwrap();
        let commit = TimelineCommit {
            revisions: vec![EpisodeRevision {
                episode_id: episode.id,
                expected_revision: 0,
                duration: 600,
            }],
            ops: vec![insert_op(episode.id, 0, 600), PerformanceOp::Delete { id: 99 }],
        };
        assert_matches!(
            store.commit_timeline(&commit).await,
            Err(CoreError::NotFound { entity: "Performance", .. })
        );
        assert_eq!(store.performance_count().unwrap(), 0);
        assert_eq!(store.load_timeline(episode.id).await.unwrap().revision, 0);
    }

    #[tokio::test]
    async fn status_swap_is_compare_and_set() {
        let store = MemoryStore::seeded();
        let episode = store.insert_episode(&new_episode("Pilot")).await.unwrap();
        assert!(store
            .swap_episode_status(episode.id, 3, 1)
            .await
            .unwrap()
            .is_none());
        let cancelled = store
            .swap_episode_status(episode.id, 1, 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status_id, 3);
        assert!(store.find_episode(episode.id, Some(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_pages_and_counts() {
        let store = MemoryStore::seeded();
        for i in 0..7 {
            store
                .insert_episode(&new_episode(&format!("Episode {i}")))
                .await
                .unwrap();
        }
        let filter = EpisodeFilter {
            status_id: 1,
            season_id: None,
        };
        let (second, total) = store
            .list_episodes(&filter, PageWindow::new(2, 5))
            .await
            .unwrap();
        assert_eq!(total, 7);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].name, "Episode 5");
    }

    #[tokio::test]
    async fn active_identity_is_unique_inside_the_store() {
        let store = MemoryStore::seeded();
        store
            .insert_character(&new_character("Rick Sanchez", 1))
            .await
            .unwrap();
        assert_matches!(
            store.insert_character(&new_character("Rick Sanchez", 1)).await,
            Err(CoreError::Conflict(_))
        );
        // Only active records take part in the rule.
        store
            .insert_character(&new_character("Rick Sanchez", 2))
            .await
            .unwrap();

        let morty = store
            .insert_character(&new_character("Morty Smith", 1))
            .await
            .unwrap();
        let rename = CharacterChanges {
            name: Some("Rick Sanchez".to_string()),
            ..Default::default()
        };
        assert_matches!(
            store.update_character(morty.id, 1, &rename).await,
            Err(CoreError::Conflict(_))
        );
        let stored = store.find_character(morty.id, None).await.unwrap().unwrap();
        assert_eq!(stored.name, "Morty Smith");
    }

    #[tokio::test]
    async fn active_episode_name_is_unique_per_season_inside_the_store() {
        let store = MemoryStore::seeded();
        store.insert_episode(&new_episode("Pilot")).await.unwrap();
        assert_matches!(
            store.insert_episode(&new_episode("Pilot")).await,
            Err(CoreError::Conflict(_))
        );
        store
            .insert_episode(&NewEpisode {
                season_id: Some(1),
                ..new_episode("Pilot")
            })
            .await
            .unwrap();
    }
}

//! Episode registration, edits and cancellation.
//!
//! An episode's `duration` is owned by the performance pipeline: no DTO here
//! carries it, so a caller can never set it directly.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trimmed_name, Catalog, NamedRef};
use crate::category::{Category, CategoryId, CategoryType, Classification};
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::{removal_status, EntityKind, LifecycleStatus, StatusId, Transitioned};
use crate::model::{Episode, EpisodeChanges, EpisodeFilter, NewEpisode};
use crate::pagination::Page;
use crate::timecode;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEpisode {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub air_date: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEpisode {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub air_date: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub season: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeView {
    pub id: DbId,
    pub name: String,
    pub air_date: Option<String>,
    pub season: Option<NamedRef>,
    /// Derived seconds, also rendered as `MM:SS` in `duration_code`.
    pub duration: u32,
    pub duration_code: String,
    pub status: NamedRef,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Catalog {
    pub(crate) async fn episode_view(&self, episode: Episode) -> CoreResult<EpisodeView> {
        let season = match episode.season_id {
            Some(id) => Some(self.categories().describe(id).await?.into()),
            None => None,
        };
        let status = self.status_ref(episode.status_id).await?;
        Ok(EpisodeView {
            id: episode.id,
            name: episode.name,
            air_date: episode.air_date,
            season,
            duration: episode.duration,
            duration_code: timecode::encode(episode.duration),
            status,
            created_at: episode.created_at,
            updated_at: episode.updated_at,
        })
    }

    async fn resolve_season(&self, raw: Option<String>) -> CoreResult<Option<CategoryId>> {
        match raw {
            Some(raw) => {
                let season = self
                    .categories()
                    .resolve_classification(Classification::from(raw), CategoryType::Seasons)
                    .await?;
                Ok(Some(season.id()))
            }
            None => Ok(None),
        }
    }

    /// Episode names are unique per season among active episodes.
    async fn ensure_unique_episode(
        &self,
        name: &str,
        season_id: Option<CategoryId>,
        active: StatusId,
        except: Option<DbId>,
    ) -> CoreResult<()> {
        match self
            .store
            .find_episode_by_name(name, season_id, active)
            .await?
        {
            Some(existing) if Some(existing.id) != except => Err(CoreError::Conflict(format!(
                "Episode with name {name} in the same season already exists"
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create_episode(&self, input: CreateEpisode) -> CoreResult<EpisodeView> {
        input.validate()?;
        let name = trimmed_name(&input.name)?;
        let season_id = self.resolve_season(input.season).await?;
        let active = self.gate().status_record(LifecycleStatus::Active).await?;
        self.ensure_unique_episode(&name, season_id, active.id, None)
            .await?;

        let episode = self
            .store
            .insert_episode(&NewEpisode {
                name,
                air_date: input.air_date,
                season_id,
                status_id: active.id,
            })
            .await?;
        tracing::info!(episode_id = episode.id, "Episode created");
        self.episode_view(episode).await
    }

    pub async fn update_episode(&self, id: DbId, input: UpdateEpisode) -> CoreResult<EpisodeView> {
        input.validate()?;
        let current = self
            .gate()
            .require_episode(id, LifecycleStatus::Active)
            .await?;

        let name = input.name.as_deref().map(trimmed_name).transpose()?;
        let season_id = self.resolve_season(input.season).await?;

        let target_name = name.as_deref().unwrap_or(&current.name);
        let target_season = season_id.or(current.season_id);
        if target_name != current.name || target_season != current.season_id {
            self.ensure_unique_episode(target_name, target_season, current.status_id, Some(id))
                .await?;
        }

        let changes = EpisodeChanges {
            name,
            air_date: input.air_date,
            season_id,
        };
        let updated = self
            .store
            .update_episode(id, current.status_id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found("Episode", id))?;
        tracing::info!(episode_id = id, "Episode updated");
        self.episode_view(updated).await
    }

    /// Soft removal: the episode is cancelled, its performances stay.
    pub async fn remove_episode(&self, id: DbId) -> CoreResult<EpisodeView> {
        self.gate()
            .require_episode(id, LifecycleStatus::Active)
            .await?;
        self.transition_episode(id, removal_status(EntityKind::Episode).name())
            .await
    }

    pub async fn transition_episode(&self, id: DbId, new_status: &str) -> CoreResult<EpisodeView> {
        match self
            .gate()
            .transition(EntityKind::Episode, id, new_status)
            .await?
        {
            Transitioned::Episode(episode) => self.episode_view(episode).await,
            Transitioned::Character(_) => Err(CoreError::Internal(
                "episode transition returned a character".to_string(),
            )),
        }
    }

    pub async fn get_episode(&self, id: DbId) -> CoreResult<EpisodeView> {
        let episode = self
            .gate()
            .require_episode(id, LifecycleStatus::Active)
            .await?;
        self.episode_view(episode).await
    }

    /// Active episodes, optionally restricted to one season.
    pub async fn list_episodes(
        &self,
        page: Option<i64>,
        season: Option<&str>,
    ) -> CoreResult<Page<EpisodeView>> {
        let active = self.gate().status_record(LifecycleStatus::Active).await?;
        let season_id = match season {
            Some(raw) => Some(self.categories().resolve(raw, CategoryType::Seasons).await?.id()),
            None => None,
        };
        let (page, window) = self.window(page);
        let filter = EpisodeFilter {
            status_id: active.id,
            season_id,
        };
        let (rows, total) = self.store.list_episodes(&filter, window).await?;
        tracing::debug!(page, total, "Listed episodes");

        let mut results = Vec::with_capacity(rows.len());
        for episode in rows {
            results.push(self.episode_view(episode).await?);
        }
        Ok(self.page(page, results, total))
    }

    /// Registered seasons.
    pub async fn seasons(&self) -> CoreResult<Vec<Category>> {
        self.members_of(CategoryType::Seasons).await
    }
}

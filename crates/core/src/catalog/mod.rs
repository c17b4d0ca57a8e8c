//! Catalog services: the write pipelines and listings built on top of the
//! codec, validator, gate and placement modules.
//!
//! Every operation runs the same ordered steps: input validation, lifecycle
//! gate, category resolution, placement (for performances), then a single
//! store write. Each step returns a transformed value or a typed error; none
//! of them mutates shared state.

pub mod characters;
pub mod episodes;
pub mod performances;

use std::sync::Arc;

use serde::Serialize;

use crate::category::{Category, CategoryType, CategoryValidator};
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::{LifecycleGate, StatusId};
use crate::pagination::{clamp_page, Page, PageWindow};
use crate::settings::CatalogSettings;
use crate::store::CatalogStore;
use crate::types::DbId;

pub use characters::{CharacterView, CreateCharacter, UpdateCharacter};
pub use episodes::{CreateEpisode, EpisodeView, UpdateEpisode};
pub use performances::{CreatePerformance, PerformanceView, UpdatePerformance};

/// Identifier plus display name of a referenced record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: DbId,
    pub name: String,
}

impl From<Category> for NamedRef {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Trimmed display name; blank names fail validation.
pub(crate) fn trimmed_name(name: &str) -> CoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("name: must not be blank".to_string()));
    }
    Ok(name.to_string())
}

/// Entry point for every catalog operation.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    settings: CatalogSettings,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>, settings: CatalogSettings) -> Self {
        tracing::info!(
            placement = settings.placement.name(),
            page_size = settings.page_size,
            "Catalog engine configured"
        );
        Self { store, settings }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    fn gate(&self) -> LifecycleGate<'_> {
        LifecycleGate::new(self.store.as_ref())
    }

    fn categories(&self) -> CategoryValidator<'_> {
        CategoryValidator::new(self.store.as_ref())
    }

    fn window(&self, page: Option<i64>) -> (i64, PageWindow) {
        let page = clamp_page(page);
        (page, PageWindow::new(page, self.settings.page_size))
    }

    fn page<T>(&self, page: i64, results: Vec<T>, total: i64) -> Page<T> {
        Page {
            results,
            total,
            page,
            page_size: self.settings.page_size,
        }
    }

    async fn status_ref(&self, id: StatusId) -> CoreResult<NamedRef> {
        let status = self
            .store
            .find_status(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Status", id))?;
        Ok(NamedRef {
            id: DbId::from(status.id),
            name: status.name,
        })
    }

    pub async fn health_check(&self) -> CoreResult<()> {
        self.store.health_check().await
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Resolve a classification value against its relation.
    pub async fn resolve_category(
        &self,
        value: &str,
        category_type: CategoryType,
    ) -> CoreResult<Category> {
        let resolved = self.categories().resolve(value, category_type).await?;
        Ok(resolved.into_category())
    }

    pub async fn members_of(&self, category_type: CategoryType) -> CoreResult<Vec<Category>> {
        self.categories().members_of(category_type).await
    }

    pub async fn register_category(
        &self,
        value: &str,
        category_type: CategoryType,
    ) -> CoreResult<Category> {
        self.categories().register(value, category_type).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::placement::PlacementPolicy;
    use crate::store::MemoryStore;

    pub fn catalog() -> Catalog {
        catalog_with(PlacementPolicy::default())
    }

    pub fn catalog_with(placement: PlacementPolicy) -> Catalog {
        Catalog::new(
            Arc::new(MemoryStore::seeded()),
            CatalogSettings::new(placement, 5),
        )
    }

    pub fn character(name: &str, specie: &str) -> CreateCharacter {
        CreateCharacter {
            name: name.to_string(),
            specie: specie.to_string(),
            kind: None,
            gender: None,
            origin: None,
            location: None,
            image: None,
            url: None,
        }
    }

    pub fn episode(name: &str, season: Option<&str>) -> CreateEpisode {
        CreateEpisode {
            name: name.to_string(),
            air_date: None,
            season: season.map(str::to_string),
        }
    }
}

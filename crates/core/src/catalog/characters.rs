//! Character registration, edits and soft removal.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trimmed_name, Catalog, NamedRef};
use crate::category::{CategoryType, Classification, ResolvedCategory};
use crate::error::{CoreError, CoreResult};
use crate::lifecycle::{
    removal_status, EntityKind, LifecycleStatus, StatusId, Transitioned, DEFAULT_STATUS,
};
use crate::model::{Character, CharacterChanges, CharacterFilter, CharacterIdentity, NewCharacter};
use crate::pagination::Page;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCharacter {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub specie: String,
    #[serde(rename = "type", default)]
    #[validate(length(max = 100))]
    pub kind: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub gender: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub origin: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub url: Option<String>,
}

/// Partial edit. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCharacter {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub specie: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub kind: Option<String>,
    #[validate(length(max = 50))]
    pub gender: Option<String>,
    #[validate(length(max = 200))]
    pub origin: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
}

/// A character with its specie and status names populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    pub id: DbId,
    pub name: String,
    pub specie: NamedRef,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub status: NamedRef,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Creation pipeline
// ---------------------------------------------------------------------------

fn normalize_kind(kind: Option<String>) -> Option<String> {
    kind.map(|k| k.trim().to_uppercase()).filter(|k| !k.is_empty())
}

/// Validated input with the specie still unresolved.
#[derive(Debug, Clone)]
struct CharacterDraft {
    name: String,
    specie: Classification,
    kind: Option<String>,
    gender: Option<String>,
    origin: Option<String>,
    location: Option<String>,
    image: Option<String>,
    url: Option<String>,
}

impl CharacterDraft {
    fn from_input(input: CreateCharacter) -> CoreResult<Self> {
        input.validate()?;
        Ok(Self {
            name: trimmed_name(&input.name)?,
            specie: Classification::from(input.specie),
            kind: normalize_kind(input.kind),
            gender: input.gender,
            origin: input.origin,
            location: input.location,
            image: input.image,
            url: input.url,
        })
    }

    fn identity(&self, specie: &ResolvedCategory) -> CharacterIdentity {
        CharacterIdentity {
            name: self.name.clone(),
            specie_id: specie.id(),
            kind: self.kind.clone(),
        }
    }

    fn into_new(self, specie: &ResolvedCategory, status_id: StatusId) -> NewCharacter {
        NewCharacter {
            name: self.name,
            specie_id: specie.id(),
            kind: self.kind,
            gender: self.gender,
            origin: self.origin,
            location: self.location,
            image: self.image,
            url: self.url,
            status_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Catalog {
    pub(crate) async fn character_view(&self, character: Character) -> CoreResult<CharacterView> {
        let specie = self.categories().describe(character.specie_id).await?;
        let status = self.status_ref(character.status_id).await?;
        Ok(CharacterView {
            id: character.id,
            name: character.name,
            specie: specie.into(),
            kind: character.kind,
            gender: character.gender,
            origin: character.origin,
            location: character.location,
            image: character.image,
            url: character.url,
            status,
            created_at: character.created_at,
            updated_at: character.updated_at,
        })
    }

    /// Fails with `Conflict` when another active character already holds
    /// `identity`.
    async fn ensure_unique_character(
        &self,
        identity: &CharacterIdentity,
        active: StatusId,
        except: Option<DbId>,
    ) -> CoreResult<()> {
        match self.store.find_character_by_identity(identity, active).await? {
            Some(existing) if Some(existing.id) != except => Err(CoreError::Conflict(format!(
                "Character with name {} using same specie and type already exists",
                identity.name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create_character(&self, input: CreateCharacter) -> CoreResult<CharacterView> {
        let draft = CharacterDraft::from_input(input)?;
        let specie = self
            .categories()
            .resolve_classification(draft.specie.clone(), CategoryType::Species)
            .await?;
        let active = self.gate().status_record(DEFAULT_STATUS).await?;
        self.ensure_unique_character(&draft.identity(&specie), active.id, None)
            .await?;

        let character = self
            .store
            .insert_character(&draft.into_new(&specie, active.id))
            .await?;
        tracing::info!(
            character_id = character.id,
            specie = specie.name(),
            "Character created"
        );
        self.character_view(character).await
    }

    pub async fn update_character(
        &self,
        id: DbId,
        input: UpdateCharacter,
    ) -> CoreResult<CharacterView> {
        input.validate()?;
        let current = self
            .gate()
            .require_character(id, LifecycleStatus::Active)
            .await?;

        let name = input.name.as_deref().map(trimmed_name).transpose()?;
        let specie = match input.specie {
            Some(raw) => Some(
                self.categories()
                    .resolve_classification(Classification::from(raw), CategoryType::Species)
                    .await?,
            ),
            None => None,
        };
        let kind = normalize_kind(input.kind);

        let identity = CharacterIdentity {
            name: name.clone().unwrap_or_else(|| current.name.clone()),
            specie_id: specie.as_ref().map_or(current.specie_id, |s| s.id()),
            kind: kind.clone().or_else(|| current.kind.clone()),
        };
        if identity != current.identity() {
            self.ensure_unique_character(&identity, current.status_id, Some(id))
                .await?;
        }

        let changes = CharacterChanges {
            name,
            specie_id: specie.map(|s| s.id()),
            kind,
            gender: input.gender,
            origin: input.origin,
            location: input.location,
            image: input.image,
            url: input.url,
        };
        let updated = self
            .store
            .update_character(id, current.status_id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found("Character", id))?;
        tracing::info!(character_id = id, "Character updated");
        self.character_view(updated).await
    }

    /// Soft removal: moves an active character to its removal status.
    /// Performance records are left untouched.
    pub async fn remove_character(&self, id: DbId) -> CoreResult<CharacterView> {
        self.gate()
            .require_character(id, LifecycleStatus::Active)
            .await?;
        self.transition_character(id, removal_status(EntityKind::Character).name())
            .await
    }

    pub async fn transition_character(
        &self,
        id: DbId,
        new_status: &str,
    ) -> CoreResult<CharacterView> {
        match self
            .gate()
            .transition(EntityKind::Character, id, new_status)
            .await?
        {
            Transitioned::Character(character) => self.character_view(character).await,
            Transitioned::Episode(_) => Err(CoreError::Internal(
                "character transition returned an episode".to_string(),
            )),
        }
    }

    pub async fn get_character(&self, id: DbId) -> CoreResult<CharacterView> {
        let character = self
            .gate()
            .require_character(id, LifecycleStatus::Active)
            .await?;
        self.character_view(character).await
    }

    /// Active characters, optionally restricted to one specie.
    pub async fn list_characters(
        &self,
        page: Option<i64>,
        specie: Option<&str>,
    ) -> CoreResult<Page<CharacterView>> {
        let active = self.gate().status_record(LifecycleStatus::Active).await?;
        let specie_id = match specie {
            Some(raw) => Some(self.categories().resolve(raw, CategoryType::Species).await?.id()),
            None => None,
        };
        let (page, window) = self.window(page);
        let filter = CharacterFilter {
            status_id: active.id,
            specie_id,
        };
        let (rows, total) = self.store.list_characters(&filter, window).await?;
        tracing::debug!(page, total, "Listed characters");

        let mut results = Vec::with_capacity(rows.len());
        for character in rows {
            results.push(self.character_view(character).await?);
        }
        Ok(self.page(page, results, total))
    }
}

//! Typed classification values (seasons, species).
//!
//! A classification attached to a character or episode arrives as a raw
//! string and must be resolved against the registered CategoryRelation for
//! its type before it can be stored. [`CategoryValidator`] is the only code
//! path that turns a [`Classification::Unresolved`] into a
//! [`Classification::Resolved`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::store::CatalogStore;
use crate::types::DbId;

pub type CategoryId = DbId;

/// Maximum length of a category name after normalization.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Seasons,
    Species,
}

impl CategoryType {
    /// CategoryRelation key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Seasons => "seasons",
            Self::Species => "species",
        }
    }

    /// Singular label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Seasons => "Season",
            Self::Species => "Specie",
        }
    }

    /// Accepts the relation key or its singular form, case-insensitively.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seasons" | "season" => Ok(Self::Seasons),
            "species" | "specie" => Ok(Self::Species),
            other => Err(CoreError::not_found("CategoryRelation", other)),
        }
    }
}

/// A registered category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A category proven to be a member of a given relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    id: CategoryId,
    name: String,
    category_type: CategoryType,
}

impl ResolvedCategory {
    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category_type(&self) -> CategoryType {
        self.category_type
    }

    pub fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Unresolved(String),
    Resolved(ResolvedCategory),
}

impl Classification {
    pub fn resolved(&self) -> Option<&ResolvedCategory> {
        match self {
            Self::Resolved(r) => Some(r),
            Self::Unresolved(_) => None,
        }
    }
}

impl From<String> for Classification {
    fn from(raw: String) -> Self {
        Self::Unresolved(raw)
    }
}

impl From<&str> for Classification {
    fn from(raw: &str) -> Self {
        Self::Unresolved(raw.to_string())
    }
}

/// Trim and uppercase a category name.
pub fn normalize_category_name(raw: &str) -> CoreResult<String> {
    let name = raw.trim().to_uppercase();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Category name must be at most {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct CategoryValidator<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CategoryValidator<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    async fn require_relation(&self, category_type: CategoryType) -> CoreResult<()> {
        if self.store.category_relation_exists(category_type).await? {
            Ok(())
        } else {
            Err(CoreError::not_found("CategoryRelation", category_type.key()))
        }
    }

    /// Resolve `value` to a member of `category_type`'s relation.
    ///
    /// An unknown name fails with `NotFound`; a known name outside the
    /// relation fails with `NotAllowed`.
    pub async fn resolve(
        &self,
        value: &str,
        category_type: CategoryType,
    ) -> CoreResult<ResolvedCategory> {
        let name = normalize_category_name(value)?;
        let category = self
            .store
            .find_category_by_name(&name)
            .await?
            .ok_or_else(|| CoreError::not_found(category_type.label(), &name))?;

        self.require_relation(category_type).await?;
        if !self
            .store
            .relation_contains(category_type, category.id)
            .await?
        {
            return Err(CoreError::NotAllowed(format!(
                "{} is not a registered {}",
                category.name,
                category_type.label()
            )));
        }

        Ok(ResolvedCategory {
            id: category.id,
            name: category.name,
            category_type,
        })
    }

    /// Resolve a classification field, accepting an already-resolved value
    /// only when it was resolved for the same type.
    pub async fn resolve_classification(
        &self,
        classification: Classification,
        category_type: CategoryType,
    ) -> CoreResult<ResolvedCategory> {
        match classification {
            Classification::Unresolved(raw) => self.resolve(&raw, category_type).await,
            Classification::Resolved(r) if r.category_type == category_type => Ok(r),
            Classification::Resolved(r) => Err(CoreError::NotAllowed(format!(
                "{} was resolved as a {}, not a {}",
                r.name,
                r.category_type.label(),
                category_type.label()
            ))),
        }
    }

    /// Registered members of a relation, in registration order.
    pub async fn members_of(&self, category_type: CategoryType) -> CoreResult<Vec<Category>> {
        self.require_relation(category_type).await?;
        self.store.list_relation_members(category_type).await
    }

    /// Register `value` as a member of `category_type`, creating the
    /// category when it does not exist yet.
    pub async fn register(&self, value: &str, category_type: CategoryType) -> CoreResult<Category> {
        let name = normalize_category_name(value)?;
        self.require_relation(category_type).await?;

        let category = match self.store.find_category_by_name(&name).await? {
            Some(existing) => existing,
            None => self.store.insert_category(&name).await?,
        };
        if self
            .store
            .relation_contains(category_type, category.id)
            .await?
        {
            return Err(CoreError::Conflict(format!(
                "{} is already a registered {}",
                category.name,
                category_type.label()
            )));
        }
        self.store
            .add_relation_member(category_type, category.id)
            .await?;

        tracing::info!(
            category_id = category.id,
            relation = category_type.key(),
            name = %category.name,
            "Category registered"
        );
        Ok(category)
    }

    /// Look up a category by id for display.
    pub async fn describe(&self, id: CategoryId) -> CoreResult<Category> {
        self.store
            .find_category(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", id))
    }
}

//! Character rows.

use catalog_core::category::CategoryId;
use catalog_core::lifecycle::StatusId;
use catalog_core::model::Character;
use catalog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `characters` table.
#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: DbId,
    pub name: String,
    pub specie_id: CategoryId,
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

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Character {
            id: row.id,
            name: row.name,
            specie_id: row.specie_id,
            kind: row.kind,
            gender: row.gender,
            origin: row.origin,
            location: row.location,
            image: row.image,
            url: row.url,
            status_id: row.status_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

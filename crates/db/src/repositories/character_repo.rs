//! Repository for the `characters` table.

use catalog_core::category::CategoryId;
use catalog_core::lifecycle::StatusId;
use catalog_core::model::{CharacterChanges, CharacterIdentity, NewCharacter};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::CharacterRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, specie_id, kind, gender, origin, location, image, url, \
     status_id, created_at, updated_at";

/// Provides CRUD and status operations for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    ///
    /// A duplicate active identity violates `uq_characters_active_identity`.
    pub async fn create(pool: &PgPool, input: &NewCharacter) -> Result<CharacterRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters
                (name, specie_id, kind, gender, origin, location, image, url, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(&input.name)
            .bind(input.specie_id)
            .bind(&input.kind)
            .bind(&input.gender)
            .bind(&input.origin)
            .bind(&input.location)
            .bind(&input.image)
            .bind(&input.url)
            .bind(input.status_id)
            .fetch_one(pool)
            .await
    }

    /// Find a character by ID, optionally restricted to one status.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        status_id: Option<StatusId>,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2)"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_identity(
        pool: &PgPool,
        identity: &CharacterIdentity,
        status_id: StatusId,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE name = $1 AND specie_id = $2 AND kind IS NOT DISTINCT FROM $3
               AND status_id = $4
             LIMIT 1"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(&identity.name)
            .bind(identity.specie_id)
            .bind(&identity.kind)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a character that is still in `status_id`. Only non-`None`
    /// fields in `changes` are applied.
    ///
    /// Returns `None` if no such row exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
        changes: &CharacterChanges,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($3, name),
                specie_id = COALESCE($4, specie_id),
                kind = COALESCE($5, kind),
                gender = COALESCE($6, gender),
                origin = COALESCE($7, origin),
                location = COALESCE($8, location),
                image = COALESCE($9, image),
                url = COALESCE($10, url),
                updated_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(id)
            .bind(status_id)
            .bind(&changes.name)
            .bind(changes.specie_id)
            .bind(&changes.kind)
            .bind(&changes.gender)
            .bind(&changes.origin)
            .bind(&changes.location)
            .bind(&changes.image)
            .bind(&changes.url)
            .fetch_optional(pool)
            .await
    }

    /// One page of characters in `status_id`, ordered by ID.
    pub async fn list(
        pool: &PgPool,
        status_id: StatusId,
        specie_id: Option<CategoryId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CharacterRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE status_id = $1 AND ($2::BIGINT IS NULL OR specie_id = $2)
             ORDER BY id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(status_id)
            .bind(specie_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        status_id: StatusId,
        specie_id: Option<CategoryId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM characters
             WHERE status_id = $1 AND ($2::BIGINT IS NULL OR specie_id = $2)",
        )
        .bind(status_id)
        .bind(specie_id)
        .fetch_one(pool)
        .await
    }

    /// Compare-and-set the status. Returns `None` if the row was not in `from`.
    pub async fn swap_status(
        pool: &PgPool,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> Result<Option<CharacterRow>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET status_id = $3, updated_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRow>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `statuses` lookup table and `status_relations`.

use catalog_core::lifecycle::StatusId;
use sqlx::PgPool;

use crate::models::status::StatusRow;

/// Read-only access to lifecycle statuses; they are installed by the seed
/// migration and never written at runtime.
pub struct StatusRepo;

impl StatusRepo {
    pub async fn find_by_id(pool: &PgPool, id: StatusId) -> Result<Option<StatusRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusRow>("SELECT id, name FROM statuses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<StatusRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusRow>("SELECT id, name FROM statuses WHERE name = UPPER($1)")
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// Status ids legal for `entity`, or `None` if no relation row exists.
    pub async fn relation_members(
        pool: &PgPool,
        entity: &str,
    ) -> Result<Option<Vec<StatusId>>, sqlx::Error> {
        let relation_id: Option<StatusId> =
            sqlx::query_scalar("SELECT id FROM status_relations WHERE entity = $1")
                .bind(entity)
                .fetch_optional(pool)
                .await?;
        let Some(relation_id) = relation_id else {
            return Ok(None);
        };

        let members = sqlx::query_scalar::<_, StatusId>(
            "SELECT status_id FROM status_relation_members
             WHERE relation_id = $1
             ORDER BY status_id ASC",
        )
        .bind(relation_id)
        .fetch_all(pool)
        .await?;
        Ok(Some(members))
    }
}

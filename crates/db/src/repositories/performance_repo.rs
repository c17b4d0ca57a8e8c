//! Repository for the `performances` table.
//!
//! Reads take `&PgPool`. Writes only ever happen inside a timeline commit and
//! take the transaction's `&mut PgConnection`.

use catalog_core::model::PerformanceFilter;
use catalog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::performance::PerformanceRow;

const COLUMNS: &str = "id, episode_id, character_id, start_secs, end_secs, created_at, updated_at";

/// Same columns, qualified for queries joining episodes and characters.
const JOINED_COLUMNS: &str = "p.id, p.episode_id, p.character_id, p.start_secs, p.end_secs, \
     p.created_at, p.updated_at";

/// Shared FROM/WHERE for filtered listings. Every filter field is optional.
const FILTERED_FROM: &str = "FROM performances p
     JOIN episodes e ON e.id = p.episode_id
     JOIN characters c ON c.id = p.character_id
     WHERE ($1::BIGINT IS NULL OR p.episode_id = $1)
       AND ($2::SMALLINT IS NULL OR e.status_id = $2)
       AND ($3::BIGINT IS NULL OR e.season_id = $3)
       AND ($4::BIGINT IS NULL OR p.character_id = $4)
       AND ($5::SMALLINT IS NULL OR c.status_id = $5)";

/// Interval columns for an insert or replace, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceWrite {
    pub episode_id: DbId,
    pub character_id: DbId,
    pub start_secs: i32,
    pub end_secs: i32,
}

pub struct PerformanceRepo;

impl PerformanceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PerformanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM performances WHERE id = $1");
        sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every performance of an episode, start ascending.
    pub async fn list_for_episode(
        pool: &PgPool,
        episode_id: DbId,
    ) -> Result<Vec<PerformanceRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM performances
             WHERE episode_id = $1
             ORDER BY start_secs ASC, id ASC"
        );
        sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(episode_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &PerformanceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PerformanceRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} {FILTERED_FROM}
             ORDER BY p.episode_id ASC, p.start_secs ASC, p.id ASC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(filter.episode_id)
            .bind(filter.episode_status_id)
            .bind(filter.season_id)
            .bind(filter.character_id)
            .bind(filter.character_status_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &PerformanceFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) {FILTERED_FROM}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.episode_id)
            .bind(filter.episode_status_id)
            .bind(filter.season_id)
            .bind(filter.character_id)
            .bind(filter.character_status_id)
            .fetch_one(pool)
            .await
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: &PerformanceWrite,
    ) -> Result<PerformanceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO performances (episode_id, character_id, start_secs, end_secs)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(input.episode_id)
            .bind(input.character_id)
            .bind(input.start_secs)
            .bind(input.end_secs)
            .fetch_one(conn)
            .await
    }

    /// Replace every column of an existing performance. `None` if missing.
    pub async fn replace(
        conn: &mut PgConnection,
        id: DbId,
        input: &PerformanceWrite,
    ) -> Result<Option<PerformanceRow>, sqlx::Error> {
        let query = format!(
            "UPDATE performances SET
                episode_id = $2,
                character_id = $3,
                start_secs = $4,
                end_secs = $5,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PerformanceRow>(&query)
            .bind(id)
            .bind(input.episode_id)
            .bind(input.character_id)
            .bind(input.start_secs)
            .bind(input.end_secs)
            .fetch_optional(conn)
            .await
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM performances WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_character(
        conn: &mut PgConnection,
        episode_id: DbId,
        character_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM performances WHERE episode_id = $1 AND character_id = $2")
                .bind(episode_id)
                .bind(character_id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }
}

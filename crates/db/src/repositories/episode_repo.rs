//! Repository for the `episodes` table.

use catalog_core::category::CategoryId;
use catalog_core::lifecycle::StatusId;
use catalog_core::model::{EpisodeChanges, NewEpisode};
use catalog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::episode::{EpisodeRevisionRow, EpisodeRow};

const COLUMNS: &str =
    "id, name, air_date, season_id, duration, status_id, revision, created_at, updated_at";

/// Episode CRUD plus the revision compare-and-set used by timeline commits.
///
/// `duration` and `revision` are never written by [`EpisodeRepo::create`] or
/// [`EpisodeRepo::update`]; only [`EpisodeRepo::bump_revision`] touches them.
pub struct EpisodeRepo;

impl EpisodeRepo {
    pub async fn create(pool: &PgPool, input: &NewEpisode) -> Result<EpisodeRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (name, air_date, season_id, status_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(&input.name)
            .bind(&input.air_date)
            .bind(input.season_id)
            .bind(input.status_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        status_id: Option<StatusId>,
    ) -> Result<Option<EpisodeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2)"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
        season_id: Option<CategoryId>,
        status_id: StatusId,
    ) -> Result<Option<EpisodeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE name = $1 AND season_id IS NOT DISTINCT FROM $2 AND status_id = $3
             LIMIT 1"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(name)
            .bind(season_id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }

    /// Update an episode still in `status_id`. Returns `None` if no such row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
        changes: &EpisodeChanges,
    ) -> Result<Option<EpisodeRow>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET
                name = COALESCE($3, name),
                air_date = COALESCE($4, air_date),
                season_id = COALESCE($5, season_id),
                updated_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(id)
            .bind(status_id)
            .bind(&changes.name)
            .bind(&changes.air_date)
            .bind(changes.season_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        status_id: StatusId,
        season_id: Option<CategoryId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EpisodeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM episodes
             WHERE status_id = $1 AND ($2::BIGINT IS NULL OR season_id = $2)
             ORDER BY id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(status_id)
            .bind(season_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        status_id: StatusId,
        season_id: Option<CategoryId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM episodes
             WHERE status_id = $1 AND ($2::BIGINT IS NULL OR season_id = $2)",
        )
        .bind(status_id)
        .bind(season_id)
        .fetch_one(pool)
        .await
    }

    pub async fn swap_status(
        pool: &PgPool,
        id: DbId,
        from: StatusId,
        to: StatusId,
    ) -> Result<Option<EpisodeRow>, sqlx::Error> {
        let query = format!(
            "UPDATE episodes SET status_id = $3, updated_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Current revision, read before the performances of a timeline snapshot.
    pub async fn find_revision(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EpisodeRevisionRow>, sqlx::Error> {
        sqlx::query_as::<_, EpisodeRevisionRow>("SELECT id, revision FROM episodes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set the revision and store the recomputed duration.
    ///
    /// Returns `false` when the stored revision no longer equals `expected`.
    /// The row stays locked until the surrounding transaction ends.
    pub async fn bump_revision(
        conn: &mut PgConnection,
        id: DbId,
        expected: i64,
        duration: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE episodes SET revision = revision + 1, duration = $3, updated_at = NOW()
             WHERE id = $1 AND revision = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(duration)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

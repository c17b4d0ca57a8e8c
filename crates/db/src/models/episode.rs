//! Episode rows.

use catalog_core::category::CategoryId;
use catalog_core::error::CoreError;
use catalog_core::lifecycle::StatusId;
use catalog_core::model::Episode;
use catalog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::secs_from_db;

/// A row from the `episodes` table.
#[derive(Debug, Clone, FromRow)]
pub struct EpisodeRow {
    pub id: DbId,
    pub name: String,
    pub air_date: Option<String>,
    pub season_id: Option<CategoryId>,
    pub duration: i32,
    pub status_id: StatusId,
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = CoreError;

    fn try_from(row: EpisodeRow) -> Result<Self, Self::Error> {
        Ok(Episode {
            id: row.id,
            name: row.name,
            air_date: row.air_date,
            season_id: row.season_id,
            duration: secs_from_db(row.duration, "duration")?,
            status_id: row.status_id,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Revision snapshot read before a timeline load.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct EpisodeRevisionRow {
    pub id: DbId,
    pub revision: i64,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn row(duration: i32) -> EpisodeRow {
        EpisodeRow {
            id: 4,
            name: "Rixty Minutes".to_string(),
            air_date: Some("March 17, 2014".to_string()),
            season_id: Some(1),
            duration,
            status_id: 1,
            revision: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_valid_row() {
        let episode = Episode::try_from(row(754)).unwrap();
        assert_eq!(episode.duration, 754);
        assert_eq!(episode.revision, 3);
        assert_eq!(episode.season_id, Some(1));
    }

    #[test]
    fn negative_duration_is_corrupt() {
        assert_matches!(Episode::try_from(row(-5)), Err(CoreError::Internal(_)));
    }
}

//! Performance rows.
//!
//! The interval is stored as two `INTEGER` second offsets. Reading a row back
//! re-validates it through [`TimeInterval::new`], so a row that slipped past
//! the table CHECK surfaces as an internal error rather than a bogus interval.

use catalog_core::error::CoreError;
use catalog_core::interval::TimeInterval;
use catalog_core::model::Performance;
use catalog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::secs_from_db;

/// A row from the `performances` table.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceRow {
    pub id: DbId,
    pub episode_id: DbId,
    pub character_id: DbId,
    pub start_secs: i32,
    pub end_secs: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PerformanceRow> for Performance {
    type Error = CoreError;

    fn try_from(row: PerformanceRow) -> Result<Self, Self::Error> {
        let start = secs_from_db(row.start_secs, "start_secs")?;
        let end = secs_from_db(row.end_secs, "end_secs")?;
        let interval = TimeInterval::new(start, end).map_err(|e| {
            CoreError::Internal(format!("Performance {} has a corrupt interval: {e}", row.id))
        })?;
        Ok(Performance {
            id: row.id,
            episode_id: row.episode_id,
            character_id: row.character_id,
            interval,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub fn into_performances(rows: Vec<PerformanceRow>) -> Result<Vec<Performance>, CoreError> {
    rows.into_iter().map(Performance::try_from).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn row(start_secs: i32, end_secs: i32) -> PerformanceRow {
        PerformanceRow {
            id: 11,
            episode_id: 2,
            character_id: 1,
            start_secs,
            end_secs,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_stored_interval() {
        let performance = Performance::try_from(row(60, 150)).unwrap();
        assert_eq!(performance.interval.start(), 60);
        assert_eq!(performance.interval.end(), 150);
        assert_eq!(performance.interval.duration_secs(), 90);
    }

    #[test]
    fn inverted_interval_is_corrupt() {
        assert_matches!(
            Performance::try_from(row(150, 60)),
            Err(CoreError::Internal(msg)) if msg.contains("Performance 11")
        );
    }

    #[test]
    fn batch_stops_at_first_corrupt_row() {
        assert_matches!(
            into_performances(vec![row(0, 10), row(10, 4000)]),
            Err(CoreError::Internal(_))
        );
        assert_eq!(into_performances(vec![row(0, 10), row(10, 20)]).unwrap().len(), 2);
    }
}

use catalog_core::lifecycle::{Status, StatusId};
use sqlx::FromRow;

/// A row from the `statuses` lookup table.
#[derive(Debug, Clone, FromRow)]
pub struct StatusRow {
    pub id: StatusId,
    pub name: String,
}

impl From<StatusRow> for Status {
    fn from(row: StatusRow) -> Self {
        Status {
            id: row.id,
            name: row.name,
        }
    }
}

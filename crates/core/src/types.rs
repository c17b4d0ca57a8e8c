use crate::error::CoreError;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Parse an opaque identifier received from a caller.
///
/// Identifiers are positive integers; anything else is a [`CoreError::Format`].
pub fn parse_id(raw: &str, entity: &'static str) -> Result<DbId, CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::Format(format!(
            "{entity} id must be a positive integer, got '{raw}'"
        ))),
    }
}

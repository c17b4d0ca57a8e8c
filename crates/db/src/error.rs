//! Mapping from `sqlx` failures to the core error taxonomy.

use catalog_core::error::CoreError;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Convert a database failure into a [`CoreError`].
///
/// Unique violations on one of our `uq_*` constraints or indexes become
/// [`CoreError::Conflict`]. Everything else is [`CoreError::Internal`];
/// the API layer logs the detail and sanitizes the response.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(message) = unique_violation(db_err.code().as_deref(), db_err.constraint()) {
            return CoreError::Conflict(message);
        }
    }
    CoreError::Internal(err.to_string())
}

/// Conflict message for a unique violation on a named `uq_*` constraint.
pub(crate) fn unique_violation(code: Option<&str>, constraint: Option<&str>) -> Option<String> {
    if code != Some(UNIQUE_VIOLATION) {
        return None;
    }
    let constraint = constraint.filter(|c| c.starts_with("uq_"))?;
    let message = match constraint {
        "uq_characters_active_identity" => {
            "Character with the same name, specie and type already exists".to_string()
        }
        "uq_episodes_active_name" => "Episode with the same name and season already exists".to_string(),
        "uq_categories_name" => "Category already exists".to_string(),
        other => format!("Duplicate value violates unique constraint {other}"),
    };
    Some(message)
}

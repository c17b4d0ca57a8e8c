//! Database row structs.
//!
//! Each submodule contains a `FromRow` struct matching the table row and a
//! conversion into the matching `catalog_core` record. Conversions that can
//! fail (integer narrowing, interval bounds) go through `TryFrom` and report
//! a corrupt row as [`CoreError::Internal`](catalog_core::error::CoreError).

pub mod category;
pub mod character;
pub mod episode;
pub mod performance;
pub mod status;

use catalog_core::error::CoreError;

/// Narrow a stored `INTEGER` seconds value to the core's `u32`.
pub(crate) fn secs_from_db(value: i32, column: &'static str) -> Result<u32, CoreError> {
    u32::try_from(value)
        .map_err(|_| CoreError::Internal(format!("Stored {column} is negative: {value}")))
}

/// Widen the core's `u32` seconds to the `INTEGER` column type.
pub(crate) fn secs_to_db(value: u32, column: &'static str) -> Result<i32, CoreError> {
    i32::try_from(value)
        .map_err(|_| CoreError::Internal(format!("{column} overflows INTEGER: {value}")))
}

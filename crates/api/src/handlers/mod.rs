//! HTTP handlers. Each one parses path identifiers, calls a single catalog
//! operation and wraps the result in a response envelope.

pub mod categories;
pub mod characters;
pub mod episodes;
pub mod performances;

use serde::Deserialize;

/// Body of `PUT /{resource}/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

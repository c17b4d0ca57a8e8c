//! Shared query parameter types for API handlers.

use catalog_core::catalog::performances::CharacterScope;
use catalog_core::error::CoreResult;
use catalog_core::types::parse_id;
use serde::Deserialize;

/// `?page=` on every listing. Values below 1 are clamped by the core.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// `GET /characters?page=&specie=`
#[derive(Debug, Default, Deserialize)]
pub struct CharacterListParams {
    pub page: Option<i64>,
    pub specie: Option<String>,
}

/// `GET /episodes?page=&season=`
#[derive(Debug, Default, Deserialize)]
pub struct EpisodeListParams {
    pub page: Option<i64>,
    pub season: Option<String>,
}

/// `?page=&character_id=&character_status=` on the episode performance listings.
///
/// `character_id` is kept raw so a malformed value fails as a format error
/// rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PerformanceListParams {
    pub page: Option<i64>,
    pub character_id: Option<String>,
    pub character_status: Option<String>,
}

impl PerformanceListParams {
    pub fn scope(&self) -> CoreResult<CharacterScope> {
        let character_id = self
            .character_id
            .as_deref()
            .map(|raw| parse_id(raw, "Character"))
            .transpose()?;
        Ok(CharacterScope {
            character_id,
            character_status: self.character_status.clone(),
        })
    }
}

use crate::pagination::{clamp_page_size, DEFAULT_PAGE_SIZE};
use crate::placement::PlacementPolicy;

/// Engine settings fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// The single placement policy active for this process.
    pub placement: PlacementPolicy,
    pub page_size: i64,
}

impl CatalogSettings {
    pub fn new(placement: PlacementPolicy, page_size: i64) -> Self {
        Self {
            placement,
            page_size: clamp_page_size(page_size),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::new(PlacementPolicy::default(), DEFAULT_PAGE_SIZE)
    }
}

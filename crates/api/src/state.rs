use std::sync::Arc;

use catalog_core::catalog::Catalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the catalog holds its store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Catalog engine over the configured store.
    pub catalog: Catalog,
    pub config: Arc<ServerConfig>,
}

use axum::routing::get;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /{type}            -> list members
/// POST   /{type}            -> register
/// GET    /{type}/{value}    -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{category_type}",
            get(categories::list).post(categories::register),
        )
        .route("/{category_type}/{value}", get(categories::resolve))
}

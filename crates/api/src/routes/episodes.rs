use axum::routing::{get, put};
use axum::Router;

use crate::handlers::episodes;
use crate::state::AppState;

/// Routes mounted at `/episodes`.
///
/// ```text
/// GET    /                  -> list active (?page=&season=)
/// POST   /                  -> create
/// GET    /seasons           -> registered seasons
/// GET    /{id}              -> get active
/// PATCH  /{id}              -> update
/// DELETE /{id}              -> cancel
/// PUT    /{id}/status       -> transition
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(episodes::list).post(episodes::create))
        .route("/seasons", get(episodes::seasons))
        .route(
            "/{id}",
            get(episodes::get_by_id)
                .patch(episodes::update)
                .delete(episodes::delete),
        )
        .route("/{id}/status", put(episodes::transition))
}

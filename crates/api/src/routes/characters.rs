use axum::routing::{get, put};
use axum::Router;

use crate::handlers::characters;
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET    /                  -> list active (?page=&specie=)
/// POST   /                  -> create
/// GET    /{id}              -> get active
/// PATCH  /{id}              -> update
/// DELETE /{id}              -> suspend
/// PUT    /{id}/status       -> transition
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(characters::list).post(characters::create))
        .route(
            "/{id}",
            get(characters::get_by_id)
                .patch(characters::update)
                .delete(characters::delete),
        )
        .route("/{id}/status", put(characters::transition))
}

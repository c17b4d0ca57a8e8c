use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::performances;
use crate::state::AppState;

/// Routes mounted at `/performances`.
///
/// `{id}` is an episode id for `GET` and the sub-routes, a performance id
/// for `PATCH` and `DELETE`.
///
/// ```text
/// POST   /                                          -> create
/// GET    /{id}                                      -> list by episode
/// PATCH  /{id}                                      -> update
/// DELETE /{id}                                      -> delete
/// GET    /{id}/validate                             -> completeness
/// DELETE /{id}/characters/{character_id}            -> remove character
/// GET    /status/{status}                           -> list by episode status
/// GET    /character/{character_id}/season/{season}  -> list by character and season
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(performances::create))
        .route(
            "/{id}",
            get(performances::list_by_episode)
                .patch(performances::update)
                .delete(performances::delete),
        )
        .route("/{id}/validate", get(performances::validate))
        .route(
            "/{id}/characters/{character_id}",
            delete(performances::remove_character),
        )
        .route("/status/{status}", get(performances::list_by_status))
        .route(
            "/character/{character_id}/season/{season}",
            get(performances::list_by_character_and_season),
        )
}

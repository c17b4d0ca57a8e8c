pub mod categories;
pub mod characters;
pub mod episodes;
pub mod health;
pub mod performances;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /categories/{type}[/{value}]                     category relations
/// /characters[/{id}[/status]]                      characters
/// /episodes[/seasons | /{id}[/status]]             episodes
/// /performances/...                                performance timeline
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/characters", characters::router())
        .nest("/episodes", episodes::router())
        .nest("/performances", performances::router())
}

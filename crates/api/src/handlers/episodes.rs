//! Handlers for the `/episodes` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::catalog::{CreateEpisode, EpisodeView, UpdateEpisode};
use catalog_core::category::Category;
use catalog_core::types::parse_id;

use super::StatusChange;
use crate::error::AppResult;
use crate::query::EpisodeListParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

/// GET /api/v1/episodes?page=&season=
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<EpisodeListParams>,
) -> AppResult<Json<PaginatedResponse<EpisodeView>>> {
    let page = state
        .catalog
        .list_episodes(params.page, params.season.as_deref())
        .await?;
    Ok(Json(PaginatedResponse::new(page, &uri)))
}

/// POST /api/v1/episodes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEpisode>,
) -> AppResult<(StatusCode, Json<DataResponse<EpisodeView>>)> {
    let episode = state.catalog.create_episode(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: episode })))
}

/// GET /api/v1/episodes/seasons
pub async fn seasons(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let seasons = state.catalog.seasons().await?;
    Ok(Json(DataResponse { data: seasons }))
}

/// GET /api/v1/episodes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<EpisodeView>>> {
    let id = parse_id(&id, "Episode")?;
    let episode = state.catalog.get_episode(id).await?;
    Ok(Json(DataResponse { data: episode }))
}

/// PATCH /api/v1/episodes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateEpisode>,
) -> AppResult<Json<DataResponse<EpisodeView>>> {
    let id = parse_id(&id, "Episode")?;
    let episode = state.catalog.update_episode(id, input).await?;
    Ok(Json(DataResponse { data: episode }))
}

/// DELETE /api/v1/episodes/{id}
///
/// Soft delete: the episode is cancelled and returned.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<EpisodeView>>> {
    let id = parse_id(&id, "Episode")?;
    let episode = state.catalog.remove_episode(id).await?;
    Ok(Json(DataResponse { data: episode }))
}

/// PUT /api/v1/episodes/{id}/status
pub async fn transition(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StatusChange>,
) -> AppResult<Json<DataResponse<EpisodeView>>> {
    let id = parse_id(&id, "Episode")?;
    let episode = state.catalog.transition_episode(id, &input.status).await?;
    Ok(Json(DataResponse { data: episode }))
}

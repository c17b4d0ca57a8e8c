//! Handlers for the `/performances` resource.
//!
//! Every write goes through the catalog's allocation pipeline; the handlers
//! only parse identifiers and pick the envelope.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::catalog::performances::CharacterRemoval;
use catalog_core::catalog::{CreatePerformance, PerformanceView, UpdatePerformance};
use catalog_core::completeness::CompletenessReport;
use catalog_core::types::parse_id;

use crate::error::AppResult;
use crate::query::{PageParams, PerformanceListParams};
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

/// POST /api/v1/performances
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePerformance>,
) -> AppResult<(StatusCode, Json<DataResponse<PerformanceView>>)> {
    let performance = state.catalog.create_performance(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: performance })))
}

/// PATCH /api/v1/performances/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePerformance>,
) -> AppResult<Json<DataResponse<PerformanceView>>> {
    let id = parse_id(&id, "Performance")?;
    let performance = state.catalog.update_performance(id, input).await?;
    Ok(Json(DataResponse { data: performance }))
}

/// DELETE /api/v1/performances/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<PerformanceView>>> {
    let id = parse_id(&id, "Performance")?;
    let performance = state.catalog.delete_performance(id).await?;
    Ok(Json(DataResponse { data: performance }))
}

/// GET /api/v1/performances/{episode_id}?page=&character_id=&character_status=
pub async fn list_by_episode(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(episode_id): Path<String>,
    Query(params): Query<PerformanceListParams>,
) -> AppResult<Json<PaginatedResponse<PerformanceView>>> {
    let episode_id = parse_id(&episode_id, "Episode")?;
    let scope = params.scope()?;
    let page = state
        .catalog
        .list_by_episode(episode_id, params.page, &scope)
        .await?;
    Ok(Json(PaginatedResponse::new(page, &uri)))
}

/// GET /api/v1/performances/{episode_id}/validate
pub async fn validate(
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
) -> AppResult<Json<DataResponse<CompletenessReport>>> {
    let episode_id = parse_id(&episode_id, "Episode")?;
    let report = state.catalog.completeness(episode_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// DELETE /api/v1/performances/{episode_id}/characters/{character_id}
pub async fn remove_character(
    State(state): State<AppState>,
    Path((episode_id, character_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<CharacterRemoval>>> {
    let episode_id = parse_id(&episode_id, "Episode")?;
    let character_id = parse_id(&character_id, "Character")?;
    let removal = state
        .catalog
        .remove_character_from_episode(character_id, episode_id)
        .await?;
    Ok(Json(DataResponse { data: removal }))
}

/// GET /api/v1/performances/status/{status}?page=&character_id=&character_status=
pub async fn list_by_status(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(status): Path<String>,
    Query(params): Query<PerformanceListParams>,
) -> AppResult<Json<PaginatedResponse<PerformanceView>>> {
    let scope = params.scope()?;
    let page = state
        .catalog
        .list_by_episode_status(&status, params.page, &scope)
        .await?;
    Ok(Json(PaginatedResponse::new(page, &uri)))
}

/// GET /api/v1/performances/character/{character_id}/season/{season}?page=
pub async fn list_by_character_and_season(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path((character_id, season)): Path<(String, String)>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PaginatedResponse<PerformanceView>>> {
    let character_id = parse_id(&character_id, "Character")?;
    let page = state
        .catalog
        .list_by_character_and_season(character_id, &season, params.page)
        .await?;
    Ok(Json(PaginatedResponse::new(page, &uri)))
}

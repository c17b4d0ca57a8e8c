//! Handlers for the `/characters` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::catalog::{CharacterView, CreateCharacter, UpdateCharacter};
use catalog_core::types::parse_id;

use super::StatusChange;
use crate::error::AppResult;
use crate::query::CharacterListParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

/// GET /api/v1/characters?page=&specie=
pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<CharacterListParams>,
) -> AppResult<Json<PaginatedResponse<CharacterView>>> {
    let page = state
        .catalog
        .list_characters(params.page, params.specie.as_deref())
        .await?;
    Ok(Json(PaginatedResponse::new(page, &uri)))
}

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCharacter>,
) -> AppResult<(StatusCode, Json<DataResponse<CharacterView>>)> {
    let character = state.catalog.create_character(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: character })))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CharacterView>>> {
    let id = parse_id(&id, "Character")?;
    let character = state.catalog.get_character(id).await?;
    Ok(Json(DataResponse { data: character }))
}

/// PATCH /api/v1/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCharacter>,
) -> AppResult<Json<DataResponse<CharacterView>>> {
    let id = parse_id(&id, "Character")?;
    let character = state.catalog.update_character(id, input).await?;
    Ok(Json(DataResponse { data: character }))
}

/// DELETE /api/v1/characters/{id}
///
/// Soft delete: the character is suspended and returned.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CharacterView>>> {
    let id = parse_id(&id, "Character")?;
    let character = state.catalog.remove_character(id).await?;
    Ok(Json(DataResponse { data: character }))
}

/// PUT /api/v1/characters/{id}/status
pub async fn transition(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StatusChange>,
) -> AppResult<Json<DataResponse<CharacterView>>> {
    let id = parse_id(&id, "Character")?;
    let character = state.catalog.transition_character(id, &input.status).await?;
    Ok(Json(DataResponse { data: character }))
}

//! Handlers for `/categories/{type}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::category::{Category, CategoryType};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterCategory {
    pub name: String,
}

/// GET /api/v1/categories/{type}
pub async fn list(
    State(state): State<AppState>,
    Path(category_type): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let category_type = CategoryType::parse(&category_type)?;
    let members = state.catalog.members_of(category_type).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/categories/{type}
pub async fn register(
    State(state): State<AppState>,
    Path(category_type): Path<String>,
    Json(input): Json<RegisterCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    let category_type = CategoryType::parse(&category_type)?;
    let category = state
        .catalog
        .register_category(&input.name, category_type)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories/{type}/{value}
pub async fn resolve(
    State(state): State<AppState>,
    Path((category_type, value)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category_type = CategoryType::parse(&category_type)?;
    let category = state.catalog.resolve_category(&value, category_type).await?;
    Ok(Json(DataResponse { data: category }))
}

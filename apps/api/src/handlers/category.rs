//! Category endpoints.
//!
//! ```text
//! GET    /categories        list
//! POST   /categories        create   → 201
//! GET    /categories/{id}   get
//! PUT    /categories/{id}   rename
//! DELETE /categories/{id}   delete   → 204 (products become uncategorized)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storefront_core::validation::validate_category_input;
use storefront_core::{Category, CategoryInput};
use tracing::instrument;

use super::path_id;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[instrument(name = "handler::list_categories", skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state
        .store("Failed to get categories", state.db.categories().list())
        .await?;
    Ok(Json(categories))
}

#[instrument(name = "handler::get_category", skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Category>> {
    let id = path_id("id", id)?;
    let category = state
        .store("Failed to get category", state.db.categories().get_by_id(&id))
        .await?;
    Ok(Json(category))
}

#[instrument(name = "handler::create_category", skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let input = validate_category_input(body)?;
    let category = state
        .store("Failed to create category", state.db.categories().create(input.name))
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(name = "handler::update_category", skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<CategoryInput>,
) -> AppResult<Json<Category>> {
    let id = path_id("id", id)?;
    let input = validate_category_input(body)?;
    let category = state
        .store("Failed to update category", state.db.categories().update(&id, input.name))
        .await?;
    Ok(Json(category))
}

#[instrument(name = "handler::delete_category", skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    let id = path_id("id", id)?;
    state
        .store("Failed to delete category", state.db.categories().soft_delete(&id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

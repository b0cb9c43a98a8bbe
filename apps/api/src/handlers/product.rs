//! Product endpoints.
//!
//! ```text
//! GET    /products?page=&pageSize=&categoryId=&minPrice=&maxPrice=
//! POST   /products        create   → 201
//! GET    /products/{id}   get
//! PUT    /products/{id}   overwrite (name, price, categoryId)
//! DELETE /products/{id}   delete   → 204
//! ```
//!
//! Prices travel as decimal strings (`"9.99"`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storefront_core::validation::{validate_product_input, validate_product_query};
use storefront_core::{ListProductsParams, Product, ProductInput};
use tracing::instrument;

use super::path_id;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Lists products, newest first, filtered and paginated.
#[instrument(name = "handler::list_products", skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListProductsParams>,
) -> AppResult<Json<Vec<Product>>> {
    let query = validate_product_query(&params)?;
    let products = state
        .store("Failed to get products", state.db.products().list(&query))
        .await?;
    Ok(Json(products))
}

#[instrument(name = "handler::get_product", skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Product>> {
    let id = path_id("id", id)?;
    let product = state
        .store("Failed to get product", state.db.products().get_by_id(&id))
        .await?;
    Ok(Json(product))
}

#[instrument(name = "handler::create_product", skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let input = validate_product_input(body)?;
    let product = state
        .store("Failed to create product", state.db.products().create(input))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(name = "handler::update_product", skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<ProductInput>,
) -> AppResult<Json<Product>> {
    let id = path_id("id", id)?;
    let input = validate_product_input(body)?;
    let product = state
        .store("Failed to update product", state.db.products().update(&id, input))
        .await?;
    Ok(Json(product))
}

#[instrument(name = "handler::delete_product", skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    let id = path_id("id", id)?;
    state
        .store("Failed to delete product", state.db.products().soft_delete(&id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

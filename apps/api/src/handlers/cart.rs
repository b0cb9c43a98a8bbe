//! Cart endpoints.
//!
//! ```text
//! GET    /carts                               list
//! POST   /carts                               create        → 201
//! GET    /carts/{id}                          get
//! DELETE /carts/{id}                          delete        → 204
//! POST   /carts/{id}/checkout                 checkout      → summary
//! GET    /carts/{id}/products                 product set
//! DELETE /carts/{id}/products                 clear         → cart
//! POST   /carts/{id}/products/{productId}     add           → cart
//! DELETE /carts/{id}/products/{productId}     remove        → cart
//! ```
//!
//! Mutations return the cart as it stands after the change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use storefront_core::{Cart, CheckoutSummary, Product};
use tracing::instrument;

use super::path_id;
use crate::error::AppResult;
use crate::extract::ApiPath;
use crate::state::AppState;

#[instrument(name = "handler::list_carts", skip(state))]
pub async fn list_carts(State(state): State<AppState>) -> AppResult<Json<Vec<Cart>>> {
    let carts = state
        .store("Failed to get carts", state.db.carts().get_all())
        .await?;
    Ok(Json(carts))
}

#[instrument(name = "handler::create_cart", skip(state))]
pub async fn create_cart(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Cart>)> {
    let cart = state
        .store("Failed to create cart", state.db.carts().create())
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

#[instrument(name = "handler::get_cart", skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Cart>> {
    let cart_id = path_id("id", id)?;
    let cart = state
        .store("Failed to get cart", state.db.carts().get_by_id(&cart_id))
        .await?;
    Ok(Json(cart))
}

#[instrument(name = "handler::delete_cart", skip(state))]
pub async fn delete_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    let cart_id = path_id("id", id)?;
    state
        .store("Failed to delete cart", state.db.carts().soft_delete(&cart_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "handler::checkout_cart", skip(state))]
pub async fn checkout_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<CheckoutSummary>> {
    let cart_id = path_id("id", id)?;
    let summary = state
        .store("Failed to checkout cart", state.db.carts().checkout(&cart_id))
        .await?;
    Ok(Json(summary))
}

#[instrument(name = "handler::get_cart_products", skip(state))]
pub async fn get_cart_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Vec<Product>>> {
    let cart_id = path_id("id", id)?;
    let products = state
        .store("Failed to get cart products", state.db.carts().get_products(&cart_id))
        .await?;
    Ok(Json(products))
}

#[instrument(name = "handler::clear_cart", skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Cart>> {
    let cart_id = path_id("id", id)?;
    let cart = state
        .store("Failed to clear cart", state.db.carts().clear(&cart_id))
        .await?;
    Ok(Json(cart))
}

#[instrument(name = "handler::add_product_to_cart", skip(state))]
pub async fn add_product_to_cart(
    State(state): State<AppState>,
    ApiPath((cart_id, product_id)): ApiPath<(String, String)>,
) -> AppResult<Json<Cart>> {
    let cart_id = path_id("id", cart_id)?;
    let product_id = path_id("productId", product_id)?;
    let cart = state
        .store(
            "Failed to add product to cart",
            state.db.carts().add_product(&cart_id, &product_id),
        )
        .await?;
    Ok(Json(cart))
}

#[instrument(name = "handler::remove_product_from_cart", skip(state))]
pub async fn remove_product_from_cart(
    State(state): State<AppState>,
    ApiPath((cart_id, product_id)): ApiPath<(String, String)>,
) -> AppResult<Json<Cart>> {
    let cart_id = path_id("id", cart_id)?;
    let product_id = path_id("productId", product_id)?;
    let cart = state
        .store(
            "Failed to remove product from cart",
            state.db.carts().remove_product(&cart_id, &product_id),
        )
        .await?;
    Ok(Json(cart))
}

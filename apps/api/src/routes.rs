//! # Route Table
//!
//! ```text
//! /health
//! /categories ─┬─ ""                     GET list · POST create
//!              └─ /{id}                  GET · PUT · DELETE
//! /products ───┬─ ""                     GET list (filters) · POST create
//!              └─ /{id}                  GET · PUT · DELETE
//! /carts ──────┬─ ""                     GET list · POST create
//!              ├─ /{id}                  GET · DELETE
//!              ├─ /{id}/checkout         POST
//!              ├─ /{id}/products         GET · DELETE (clear)
//!              └─ /{id}/products/{pid}   POST (add) · DELETE (remove)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{cart, category, health, product};
use crate::state::AppState;

/// Every registered route, printed at startup.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/categories"),
    ("POST", "/categories"),
    ("GET", "/categories/{id}"),
    ("PUT", "/categories/{id}"),
    ("DELETE", "/categories/{id}"),
    ("GET", "/products"),
    ("POST", "/products"),
    ("GET", "/products/{id}"),
    ("PUT", "/products/{id}"),
    ("DELETE", "/products/{id}"),
    ("GET", "/carts"),
    ("POST", "/carts"),
    ("GET", "/carts/{id}"),
    ("DELETE", "/carts/{id}"),
    ("POST", "/carts/{id}/checkout"),
    ("GET", "/carts/{id}/products"),
    ("DELETE", "/carts/{id}/products"),
    ("POST", "/carts/{id}/products/{productId}"),
    ("DELETE", "/carts/{id}/products/{productId}"),
];

/// Route table as `METHOD\tPATH` lines.
pub fn route_listing() -> String {
    ROUTES
        .iter()
        .map(|(method, path)| format!("{}\t{}", method, path))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the router with every route bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/categories/{id}",
            get(category::get_category)
                .put(category::update_category)
                .delete(category::delete_category),
        )
        .route(
            "/products",
            get(product::list_products).post(product::create_product),
        )
        .route(
            "/products/{id}",
            get(product::get_product)
                .put(product::update_product)
                .delete(product::delete_product),
        )
        .route("/carts", get(cart::list_carts).post(cart::create_cart))
        .route("/carts/{id}", get(cart::get_cart).delete(cart::delete_cart))
        .route("/carts/{id}/checkout", post(cart::checkout_cart))
        .route(
            "/carts/{id}/products",
            get(cart::get_cart_products).delete(cart::clear_cart),
        )
        .route(
            "/carts/{id}/products/{productId}",
            post(cart::add_product_to_cart).delete(cart::remove_product_from_cart),
        )
        .with_state(state)
}

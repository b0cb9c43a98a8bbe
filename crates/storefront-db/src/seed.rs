//! # Development Seed Data
//!
//! Wipes the store and fills it with a small, deterministic catalog.
//!
//! ## What Gets Created
//! ```text
//! 5 categories   Electronics, Clothing, Books, Home & Kitchen, Sports & Outdoors
//! 5-10 products  per category, priced $5.99 - $999.99
//! 5 carts        each holding 1-5 distinct products
//! ```
//!
//! The same database always receives the same names, prices, and cart
//! contents; only ids and timestamps differ between runs.

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use storefront_core::{Money, Product, ProductInput};

/// Category names, in creation order.
pub const CATEGORY_NAMES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Books",
    "Home & Kitchen",
    "Sports & Outdoors",
];

/// Number of carts created.
pub const CART_COUNT: usize = 5;

const MIN_PRICE_CENTS: i64 = 599;
const MAX_PRICE_CENTS: i64 = 99_999;

const ADJECTIVES: &[&str] = &[
    "Classic", "Compact", "Deluxe", "Eco", "Essential", "Premium", "Rugged", "Smart", "Ultra",
    "Vintage", "Wireless", "Everyday",
];

const NOUNS: &[&[&str]] = &[
    &["Headphones", "Speaker", "Charger", "Tablet", "Camera", "Monitor", "Keyboard"],
    &["Jacket", "Sweater", "T-Shirt", "Jeans", "Scarf", "Sneakers", "Hat"],
    &["Novel", "Cookbook", "Atlas", "Biography", "Anthology", "Journal", "Guide"],
    &["Kettle", "Blender", "Skillet", "Lamp", "Cutting Board", "Mug Set", "Toaster"],
    &["Tent", "Backpack", "Yoga Mat", "Water Bottle", "Bicycle Helmet", "Dumbbells", "Hammock"],
];

/// Counts of what a seed run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub carts: usize,
}

/// Deletes all store data and inserts the development catalog.
pub async fn seed(db: &Database) -> DbResult<SeedReport> {
    info!("Seeding database");

    wipe(db).await?;

    let mut products: Vec<Product> = Vec::new();
    for (category_idx, name) in CATEGORY_NAMES.iter().enumerate() {
        let category = db.categories().create((*name).to_string()).await?;

        for product_idx in 0..products_in_category(category_idx) {
            let product = db
                .products()
                .create(ProductInput {
                    name: product_name(category_idx, product_idx),
                    price: product_price(category_idx * 100 + product_idx),
                    category_id: Some(category.id.clone()),
                })
                .await?;
            products.push(product);
        }
    }

    for cart_idx in 0..CART_COUNT {
        let cart = db.carts().create().await?;
        for product in cart_products(cart_idx, &products) {
            db.carts().add_product(&cart.id, &product.id).await?;
        }
    }

    let report = SeedReport {
        categories: CATEGORY_NAMES.len(),
        products: products.len(),
        carts: CART_COUNT,
    };

    info!(
        categories = report.categories,
        products = report.products,
        carts = report.carts,
        "Seed complete"
    );
    Ok(report)
}

/// Removes every row (live or soft-deleted) from the store tables.
async fn wipe(db: &Database) -> DbResult<()> {
    let mut tx = db.pool().begin().await?;

    for table in ["cart_products", "products", "categories", "carts"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

// =============================================================================
// Deterministic Generators
// =============================================================================

/// 5..=10 products per category.
fn products_in_category(category_idx: usize) -> usize {
    5 + (category_idx * 3 + 2) % 6
}

fn product_name(category_idx: usize, product_idx: usize) -> String {
    let nouns = NOUNS[category_idx % NOUNS.len()];
    let adjective = ADJECTIVES[(category_idx * 5 + product_idx * 7) % ADJECTIVES.len()];
    let noun = nouns[product_idx % nouns.len()];
    format!("{} {}", adjective, noun)
}

/// A price in `MIN_PRICE_CENTS..=MAX_PRICE_CENTS`.
fn product_price(seed: usize) -> Money {
    let span = (MAX_PRICE_CENTS - MIN_PRICE_CENTS + 1) as usize;
    Money::from_cents(MIN_PRICE_CENTS + ((seed * 7919 + 1234) % span) as i64)
}

/// 1..=5 distinct products for a cart.
fn cart_products(cart_idx: usize, products: &[Product]) -> Vec<&Product> {
    if products.is_empty() {
        return Vec::new();
    }

    let count = (1 + (cart_idx * 3) % 5).min(products.len());
    let start = cart_idx * 7;
    (0..count)
        .map(|j| &products[(start + j) % products.len()])
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

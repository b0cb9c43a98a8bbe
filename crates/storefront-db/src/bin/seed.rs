//! # Seed Data Generator
//!
//! Resets a database to the development catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront_dev.db (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! Existing store data in the target database is DELETED first.

use std::env;
use std::time::Instant;

use anyhow::Context;
use storefront_db::{seed, Database, DbConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "./storefront_dev.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let db_path = match parse_args(env::args().skip(1))? {
        Some(path) => path,
        None => {
            print_usage();
            return Ok(());
        }
    };

    println!("Seeding {}", db_path);

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open database at {}", db_path))?;

    let started = Instant::now();
    let report = seed::seed(&db).await.context("seeding failed")?;
    db.close().await;

    println!(
        "Created {} categories, {} products, {} carts in {:?}",
        report.categories,
        report.products,
        report.carts,
        started.elapsed()
    );
    Ok(())
}

/// `Ok(None)` means help was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<String>> {
    let mut db_path = DEFAULT_DB_PATH.to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => db_path = args.next().context("--db requires a path")?,
            "--help" | "-h" => return Ok(None),
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    Ok(Some(db_path))
}

fn print_usage() {
    println!("Reset a database to the development catalog.");
    println!();
    println!("Usage: seed [--db <PATH>]");
    println!();
    println!("  -d, --db <PATH>    Database file (default: {})", DEFAULT_DB_PATH);
    println!("  -h, --help         Show this message");
}

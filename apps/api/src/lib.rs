//! # Storefront HTTP API
//!
//! axum front end over `storefront-db`.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ NormalizePath → Trace → CORS → security headers            │
//! │        │                                                   │
//! │        ▼                                                   │
//! │ routes ──► handlers ──► AppState::store (deadline)         │
//! │                              │                             │
//! │                              ▼                             │
//! │                   storefront-db repositories               │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

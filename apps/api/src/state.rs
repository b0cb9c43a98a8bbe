//! Shared application state handed to every handler through `State`.

use std::future::Future;
use std::sync::Arc;

use storefront_db::{Database, DbResult};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// Runs one storage operation under the request deadline.
    ///
    /// On timeout the operation's future is dropped, which cancels it and
    /// rolls back any open transaction. Storage errors are classified with
    /// `failure` as the fixed 500 message.
    pub async fn store<T, F>(&self, failure: &'static str, operation: F) -> AppResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        match tokio::time::timeout(self.config.request_timeout, operation).await {
            Ok(result) => result.map_err(|err| AppError::from_db(err, failure)),
            Err(_) => Err(AppError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storefront_db::{DbConfig, DbError};

    async fn state(timeout: Duration) -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig {
            request_timeout: timeout,
            ..AppConfig::for_tests()
        };
        AppState::new(db, config)
    }

    #[tokio::test]
    async fn test_store_passes_results_through() {
        let state = state(Duration::from_secs(1)).await;

        let value = state.store("Failed", async { Ok::<_, DbError>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = state
            .store("Failed to get cart", async {
                Err::<(), _>(DbError::not_found("Cart", "x"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_enforces_deadline() {
        let state = state(Duration::from_millis(20)).await;

        let err = state
            .store("Failed", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DbError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}

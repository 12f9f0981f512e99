//! Database operation timeout helpers
//!
//! Bounds queries and whole write transactions so a stuck store surfaces as a
//! persistence error instead of a hang.

use crate::tournament::errors::{BracketError, BracketResult};
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for a generation transaction (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for schema migrations (30 seconds)
pub const LONG_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute an operation with a timeout
///
/// A transaction dropped on timeout is rolled back by sqlx.
///
/// # Example
///
/// ```no_run
/// use bracket_engine::BracketError;
/// use bracket_engine::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> bracket_engine::BracketResult<()> {
///
/// let count: i64 = with_timeout(DEFAULT_QUERY_TIMEOUT, async {
///     sqlx::query_scalar("SELECT COUNT(*) FROM tournaments")
///         .fetch_one(pool)
///         .await
///         .map_err(BracketError::from)
/// })
/// .await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> BracketResult<T>
where
    F: std::future::Future<Output = BracketResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(BracketError::Timeout(duration)),
    }
}

/// Execute a query with the default timeout (5 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> BracketResult<T>
where
    F: std::future::Future<Output = BracketResult<T>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::errors::ErrorKind;

    #[tokio::test]
    async fn test_timeout_constants() {
        assert_eq!(DEFAULT_QUERY_TIMEOUT.as_secs(), 5);
        assert_eq!(DEFAULT_TRANSACTION_TIMEOUT.as_secs(), 10);
        assert_eq!(LONG_OPERATION_TIMEOUT.as_secs(), 30);
    }

    #[tokio::test]
    async fn test_timeout_error_display() {
        let err = BracketError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let result: BracketResult<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(BracketError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: BracketResult<()> =
            with_default_timeout(async { Err(BracketError::Storage("down".to_string())) }).await;
        assert!(matches!(result, Err(BracketError::Storage(_))));
    }
}

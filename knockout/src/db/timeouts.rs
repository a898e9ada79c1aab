//! Deadlines for PostgreSQL round trips.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use super::errors::{StoreError, StoreResult};

/// Default timeout for database queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Fail with [`StoreError::Timeout`] if `future` does not settle within `duration`
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

/// Bound a whole lifecycle transaction, including its row locks
pub async fn with_transaction_timeout<F, T>(future: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    with_timeout(DEFAULT_TRANSACTION_TIMEOUT, future).await
}

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::db::{ConnectionFuture, DbProvider};

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// How long a handler waits for a free connection before giving up with a
/// pool error (surfaced as 503).
pub const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// ## Summary
/// Creates the Postgres pool shared by request handlers and the outbox
/// dispatcher.
///
/// One connection is kept warm; the rest are opened on demand up to `size`.
/// Connections are validated on checkout so a restarted database shows up as
/// a retryable pool error instead of a failed transaction.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the provided database URL.
#[tracing::instrument(skip(database_url), fields(pool_size = size))]
pub async fn create_pool(database_url: &str, size: u32) -> anyhow::Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(size.max(1))
        .min_idle(Some(1))
        .test_on_check_out(true)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .await?;

    tracing::info!(pool_size = size, "Booking database pool ready");
    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection(&self) -> ConnectionFuture<'_> {
        Box::pin(async move { Ok(self.get().await?) })
    }
}

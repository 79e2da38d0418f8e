use crate::error::DbResult;
use std::future::Future;
use std::pin::Pin;

pub mod connection;
pub mod enums;
pub mod migrate;
pub mod query;
pub mod schema;

/// Pending checkout of a pooled connection.
pub type ConnectionFuture<'a> =
    Pin<Box<dyn Future<Output = DbResult<connection::DbConnection<'a>>> + Send + 'a>>;

/// Source of connections for HTTP handlers and the outbox dispatcher.
pub trait DbProvider: Send + Sync {
    fn get_connection(&self) -> ConnectionFuture<'_>;
}

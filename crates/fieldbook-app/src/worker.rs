//! Background delivery of queued notifications.

use std::sync::Arc;
use std::time::Duration;

use fieldbook_db::db::DbProvider;
use fieldbook_db::db::connection::DbPool;
use fieldbook_service::notify::dispatch::{DispatchConfig, dispatch_once};
use fieldbook_service::notify::sink::NotificationSink;
use tracing_futures::Instrument;

/// ## Summary
/// Spawns the outbox dispatcher. Each tick claims a batch of due events and
/// hands them to `sink`; failures are logged and retried on a later tick.
pub fn spawn_dispatcher(
    pool: DbPool,
    sink: Arc<dyn NotificationSink>,
    config: DispatchConfig,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tracing::info!(
        poll_interval_secs = poll_interval.as_secs(),
        batch_size = config.batch_size,
        "Starting notification dispatcher"
    );

    tokio::spawn(
        async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut conn = match pool.get_connection().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Dispatcher could not get a connection");
                        continue;
                    }
                };

                if let Err(e) = dispatch_once(&mut conn, sink.as_ref(), &config).await {
                    tracing::error!(error = %e, "Dispatch pass failed");
                }
            }
        }
        .instrument(tracing::info_span!("notification_dispatcher")),
    )
}

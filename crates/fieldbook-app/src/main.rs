use std::sync::Arc;
use std::time::Duration;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use fieldbook_app::app::api::routes;
use fieldbook_app::config::ConfigHandler;
use fieldbook_app::db_handler::DbProviderHandler;
use fieldbook_app::payments_handler::PaymentProviderHandler;
use fieldbook_app::worker::spawn_dispatcher;
use fieldbook_core::config::load_config;
use fieldbook_db::db::connection::create_pool;
use fieldbook_db::db::migrate::run_migrations;
use fieldbook_service::notify::dispatch::DispatchConfig;
use fieldbook_service::notify::sink::{LogSink, NotificationSink, WebhookSink};
use fieldbook_service::payment;
use fieldbook_service::rules::BookingRules;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Fieldbook booking server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    if config.database.run_migrations {
        run_migrations(&config.database.url).await?;
    }

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let rules = BookingRules::from_settings(&config)?;
    let payments: Arc<dyn payment::PaymentIntentProvider> =
        Arc::from(payment::from_config(&config.payments)?);

    let sink: Arc<dyn NotificationSink> = match config.notifications.webhook_url.as_deref() {
        Some(url) if !url.trim().is_empty() => Arc::new(WebhookSink::new(
            url,
            WEBHOOK_TIMEOUT,
        )?),
        _ => Arc::new(LogSink),
    };

    spawn_dispatcher(
        pool.clone(),
        sink,
        DispatchConfig::from(&config.notifications),
        Duration::from_secs(config.notifications.poll_interval_secs),
    );

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler::new(pool))
        .hoop(ConfigHandler {
            settings: Arc::new(config),
            rules: Arc::new(rules),
        })
        .hoop(PaymentProviderHandler { provider: payments })
        .push(routes()?);

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}

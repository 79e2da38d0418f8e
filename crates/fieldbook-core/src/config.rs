use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::catalog::SlotCatalog;
use crate::error::{CoreError, CoreResult};
use crate::policy::{CancellationPolicy, MAX_CANCELLATION_WINDOW_HOURS};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub scheduling: SchedulingConfig,
    pub booking: BookingConfig,
    pub payments: PaymentsConfig,
    pub notifications: NotificationsConfig,
}

/// Identity is established upstream; the gateway forwards it in these headers.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub user_header: String,
    pub role_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// IANA zone the slot catalog is expressed in.
    pub timezone: String,
    pub first_slot_hour: u32,
    pub last_slot_hour: u32,
    pub slot_interval_minutes: u32,
    pub search_radius_km: f64,
}

impl SchedulingConfig {
    /// ## Summary
    /// Builds the slot catalog described by this section.
    ///
    /// ## Errors
    /// Returns a configuration error if the timezone is unknown or the hours
    /// do not describe a non-empty day.
    pub fn catalog(&self) -> CoreResult<SlotCatalog> {
        let tz: chrono_tz::Tz = self.timezone.parse().map_err(|_err| {
            CoreError::ConfigError(format!("unknown timezone '{}'", self.timezone))
        })?;
        SlotCatalog::new(
            tz,
            self.first_slot_hour,
            self.last_slot_hour,
            self.slot_interval_minutes,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub cancellation_window_hours: i64,
    pub release_slot_on_cancel: bool,
    pub site_fee_percent: u32,
    pub currency: String,
}

impl BookingConfig {
    #[must_use]
    pub fn cancellation_policy(&self) -> CancellationPolicy {
        CancellationPolicy::from_hours(self.cancellation_window_hours)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    pub intent_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    pub webhook_url: Option<String>,
    pub poll_interval_secs: u64,
    pub batch_size: i64,
    pub max_attempts: i32,
    pub retry_backoff_secs: i64,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml`. Environment variables use the `FIELDBOOK__SECTION__KEY` form.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("database.max_connections", 4)?
            .set_default("database.run_migrations", true)?
            .set_default("logging.level", "debug")?
            .set_default("auth.user_header", "x-user-id")?
            .set_default("auth.role_header", "x-user-role")?
            .set_default("scheduling.timezone", "UTC")?
            .set_default("scheduling.first_slot_hour", 9)?
            .set_default("scheduling.last_slot_hour", 17)?
            .set_default("scheduling.slot_interval_minutes", 60)?
            .set_default("scheduling.search_radius_km", 10.0)?
            .set_default("booking.cancellation_window_hours", 3)?
            .set_default("booking.release_slot_on_cancel", false)?
            .set_default("booking.site_fee_percent", 10)?
            .set_default("booking.currency", "usd")?
            .set_default("payments.timeout_secs", 30)?
            .set_default("notifications.poll_interval_secs", 5)?
            .set_default("notifications.batch_size", 50)?
            .set_default("notifications.max_attempts", 5)?
            .set_default("notifications.retry_backoff_secs", 30)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("FIELDBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// ## Errors
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> CoreResult<()> {
        self.scheduling.catalog()?;

        if !(self.scheduling.search_radius_km.is_finite() && self.scheduling.search_radius_km > 0.0)
        {
            return Err(CoreError::ConfigError(
                "scheduling.search_radius_km must be positive".to_string(),
            ));
        }
        let window = self.booking.cancellation_window_hours;
        if !(0..=MAX_CANCELLATION_WINDOW_HOURS).contains(&window) {
            return Err(CoreError::ConfigError(format!(
                "booking.cancellation_window_hours must be in 0..={MAX_CANCELLATION_WINDOW_HOURS}, \
                 got {window}"
            )));
        }
        if self.booking.site_fee_percent > 100 {
            return Err(CoreError::ConfigError(
                "booking.site_fee_percent must be at most 100".to_string(),
            ));
        }
        if self.notifications.batch_size <= 0 || self.notifications.max_attempts <= 0 {
            return Err(CoreError::ConfigError(
                "notifications.batch_size and notifications.max_attempts must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading, deserializing or validating the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;
    Ok(settings)
}

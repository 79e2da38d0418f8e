//! Payment-intent providers used by online settlement.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldbook_core::config::PaymentsConfig;

/// Connect timeout for the provider, independent of the request timeout.
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum PaymentIntentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned status {0}")]
    Rejected(u16),
}

/// What settlement needs from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentRequest<'a> {
    pub booking_id: uuid::Uuid,
    pub amount: i64,
    pub currency: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub client_secret: String,
}

pub trait PaymentIntentProvider: Send + Sync {
    fn create_intent<'a>(
        &'a self,
        request: IntentRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentIntentError>> + Send + 'a>>;
}

/// Rejects every intent. Cash settlement keeps working without a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPaymentIntentProvider;

impl PaymentIntentProvider for UnconfiguredPaymentIntentProvider {
    fn create_intent<'a>(
        &'a self,
        _request: IntentRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentIntentError>> + Send + 'a>> {
        Box::pin(async { Err(PaymentIntentError::NotConfigured) })
    }
}

/// Creates intents by POSTing to the provider's HTTP endpoint with a bearer key.
#[derive(Debug, Clone)]
pub struct HttpPaymentIntentProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpPaymentIntentProvider {
    /// ## Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentIntentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }
}

impl PaymentIntentProvider for HttpPaymentIntentProvider {
    fn create_intent<'a>(
        &'a self,
        request: IntentRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentIntentError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.post(&self.url).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(
                    booking_id = %request.booking_id,
                    status = status.as_u16(),
                    "Payment provider rejected intent"
                );
                return Err(PaymentIntentError::Rejected(status.as_u16()));
            }

            Ok(response.json::<PaymentIntent>().await?)
        })
    }
}

/// ## Summary
/// Chooses the provider described by configuration.
///
/// ## Errors
/// Returns an error if the HTTP client cannot be built.
pub fn from_config(
    config: &PaymentsConfig,
) -> Result<Box<dyn PaymentIntentProvider>, PaymentIntentError> {
    match &config.intent_url {
        Some(url) if !url.trim().is_empty() => Ok(Box::new(HttpPaymentIntentProvider::new(
            url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        _ => {
            tracing::info!("No payment provider configured; online payments are disabled");
            Ok(Box::new(UnconfiguredPaymentIntentProvider))
        }
    }
}

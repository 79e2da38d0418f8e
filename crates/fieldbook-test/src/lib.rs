//! Fieldbook integration test support.
//!
//! In-memory stand-ins for the collaborators the scheduling core talks to:
//! the notification sink and the payment-intent provider.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use fieldbook_service::notify::sink::{Notification, NotificationSink, SinkError, SinkResult};
use fieldbook_service::payment::{
    IntentRequest, PaymentIntent, PaymentIntentError, PaymentIntentProvider,
};

/// Records every notification it accepts. Recipients registered with
/// [`MemorySink::fail_for`] are rejected instead.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
    failing: Mutex<HashSet<uuid::Uuid>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient_id: uuid::Uuid) {
        self.failing
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(recipient_id);
    }

    #[must_use]
    pub fn delivered_to(&self, recipient_id: uuid::Uuid) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }
}

impl NotificationSink for MemorySink {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = SinkResult> + Send + 'a>> {
        Box::pin(async move {
            let rejected = self
                .failing
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .contains(&notification.recipient_id);
            if rejected {
                return Err(SinkError::Rejected(503));
            }
            self.delivered
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(notification.clone());
            Ok(())
        })
    }
}

/// Hands out predictable client secrets, or fails every call.
#[derive(Debug, Default)]
pub struct StubPaymentProvider {
    fail: bool,
    calls: AtomicUsize,
}

impl StubPaymentProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentIntentProvider for StubPaymentProvider {
    fn create_intent<'a>(
        &'a self,
        request: IntentRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentIntentError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PaymentIntentError::Rejected(502));
            }
            Ok(PaymentIntent {
                client_secret: format!("secret_{}_{}", request.booking_id, request.amount),
            })
        })
    }
}

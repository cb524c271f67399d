//! Notification collaborator.

use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;
use tripsplit_shared::OutgoingEmail;

/// Delivery failed. Reported back to callers as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Sends outbound email on behalf of the ledger.
pub trait Notifier: Send + Sync + 'static {
    /// Sends one email.
    fn send(&self, email: &OutgoingEmail)
    -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Notifier that keeps every email in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that rejects every email without recording it.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns the emails accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError("recording notifier set to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| DeliveryError("recording notifier lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

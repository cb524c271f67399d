//! SMTP delivery for ledger notifications.

use tracing::{info, warn};
use tripsplit_core::{DeliveryError, Notifier};
use tripsplit_shared::{EmailService, OutgoingEmail};

/// [`Notifier`] backed by the SMTP [`EmailService`].
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    email: EmailService,
}

impl EmailNotifier {
    /// Wraps an email service.
    #[must_use]
    pub const fn new(email: EmailService) -> Self {
        Self { email }
    }
}

impl Notifier for EmailNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        match self.email.send(email).await {
            Ok(()) => {
                info!(to = %email.to, subject = %email.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                warn!(to = %email.to, error = %e, "Email delivery failed");
                Err(DeliveryError(e.to_string()))
            }
        }
    }
}

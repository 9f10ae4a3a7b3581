use std::future::Future;

use portfolio_models::{contact::ContactSubmission, email::SentEmail};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate a contact form submission and forward it to the site owner.
    ///
    /// `client` identifies the caller for rate limiting.
    fn submit(
        &self,
        client: &str,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<SentEmail, ContactSubmitError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("No email service has been configured.")]
    NotConfigured,
    #[error("Too many submissions from this client.")]
    RateLimited,
    #[error("The honeypot field has been filled in.")]
    BotDetected,
    #[error("A required field is missing.")]
    MissingFields,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Invalid name.")]
    InvalidName,
    #[error("Invalid message.")]
    InvalidMessage,
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        client: String,
        submission: ContactSubmission,
        result: Result<SentEmail, ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(
                mockall::predicate::eq(client),
                mockall::predicate::eq(submission),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}

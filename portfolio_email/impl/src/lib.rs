use portfolio_email_contracts::{Email, EmailService};
use portfolio_models::email::SentEmail;

pub use crate::{resend::ResendEmailServiceImpl, smtp::SmtpEmailServiceImpl};

pub mod resend;
pub mod smtp;

/// The email provider selected in the configuration.
#[derive(Debug, Clone)]
pub enum EmailServiceImpl {
    Resend(ResendEmailServiceImpl),
    Smtp(SmtpEmailServiceImpl),
}

impl EmailServiceImpl {
    #[cfg(feature = "dummy")]
    pub async fn dummy() -> Self {
        Self::Smtp(
            SmtpEmailServiceImpl::new("smtp://dummy", "dummy@example.com".parse().unwrap())
                .await
                .unwrap(),
        )
    }
}

impl From<ResendEmailServiceImpl> for EmailServiceImpl {
    fn from(value: ResendEmailServiceImpl) -> Self {
        Self::Resend(value)
    }
}

impl From<SmtpEmailServiceImpl> for EmailServiceImpl {
    fn from(value: SmtpEmailServiceImpl) -> Self {
        Self::Smtp(value)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<Option<SentEmail>> {
        match self {
            Self::Resend(resend) => resend.send(email).await,
            Self::Smtp(smtp) => smtp.send(email).await,
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Resend(resend) => resend.ping().await,
            Self::Smtp(smtp) => smtp.ping().await,
        }
    }
}

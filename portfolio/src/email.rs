use anyhow::{bail, Context};
use portfolio_config::EmailConfig;
use portfolio_email_impl::{EmailServiceImpl, ResendEmailServiceImpl, SmtpEmailServiceImpl};

/// Set up the configured email provider
///
/// Returns `None` if no provider has been configured.
pub async fn connect(config: &EmailConfig) -> anyhow::Result<Option<EmailServiceImpl>> {
    let resend = config
        .resend
        .as_ref()
        .filter(|resend| !resend.api_key.trim().is_empty());

    match (resend, &config.smtp) {
        (Some(_), Some(_)) => bail!("Only one of email.resend and email.smtp can be configured"),
        (Some(resend), None) => ResendEmailServiceImpl::new(
            &resend.api_key,
            config.from.clone(),
            resend.endpoint_override.clone(),
        )
        .context("Failed to create Resend client")
        .map(|resend| Some(resend.into())),
        (None, Some(smtp)) => SmtpEmailServiceImpl::new(&smtp.url, config.from.clone())
            .await
            .context("Failed to connect to SMTP server")
            .map(|smtp| Some(smtp.into())),
        (None, None) => Ok(None),
    }
}

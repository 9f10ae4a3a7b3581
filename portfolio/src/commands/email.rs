use anyhow::Context;
use clap::Subcommand;
use portfolio_config::Config;
use portfolio_email_contracts::{Email, EmailBody, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email)
        .await?
        .context("No email service configured")?;

    let sent = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody {
                text: "Email deliverability seems to be working!".into(),
                html: None,
            },
            reply_to: None,
        })
        .await?
        .context("Failed to send email")?;

    info!(id = %sent.id, "Email sent");

    Ok(())
}

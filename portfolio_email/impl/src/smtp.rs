use anyhow::{anyhow, Context};
use lettre::{
    message::{header, Mailbox, MessageBuilder, MultiPart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use portfolio_email_contracts::{Email, EmailService};
use portfolio_models::{email::SentEmail, email_address::EmailAddressWithName};
use portfolio_utils::Apply;

#[derive(Debug, Clone)]
pub struct SmtpEmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailServiceImpl {
    pub async fn new(url: &str, from: EmailAddressWithName) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)?.build();

        Ok(Self { from, transport })
    }
}

impl EmailService for SmtpEmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<Option<SentEmail>> {
        let message = build_message(&self.from, email)?;

        let response = self.transport.send(message).await?;

        Ok(response.is_positive().then(|| SentEmail {
            id: response.message().collect::<Vec<_>>().join(" "),
        }))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn build_message(from: &EmailAddressWithName, email: Email) -> anyhow::Result<Message> {
    let reply_to = email
        .reply_to
        .map(|x| x.parse::<Mailbox>())
        .transpose()
        .context("Invalid reply-to address")?;

    let builder = Message::builder()
        .from(from.0.clone())
        .to(email.recipient.0)
        .apply_map(reply_to, MessageBuilder::reply_to)
        .subject(email.subject);

    let message = match email.body.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.body.text, html))?,
        None => builder
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.body.text)?,
    };

    Ok(message)
}

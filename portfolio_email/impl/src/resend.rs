use std::sync::Arc;

use anyhow::Context;
use portfolio_email_contracts::{Email, EmailService};
use portfolio_models::{email::SentEmail, email_address::EmailAddressWithName};
use portfolio_utils::http::HttpClient;
use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;

const RESEND_API_ENDPOINT: &str = "https://api.resend.com/";

/// Sends emails through the HTTP API of [Resend](https://resend.com/).
#[derive(Clone)]
pub struct ResendEmailServiceImpl {
    from: EmailAddressWithName,
    api_key: Arc<str>,
    endpoint: Arc<Url>,
    client: HttpClient,
}

impl std::fmt::Debug for ResendEmailServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendEmailServiceImpl")
            .field("from", &self.from)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ResendEmailServiceImpl {
    pub fn new(
        api_key: &str,
        from: EmailAddressWithName,
        endpoint_override: Option<Url>,
    ) -> anyhow::Result<Self> {
        let endpoint = match endpoint_override {
            Some(endpoint) => endpoint,
            None => RESEND_API_ENDPOINT.parse()?,
        };

        Ok(Self {
            from,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client: HttpClient::new().context("Failed to create http client")?,
        })
    }
}

impl EmailService for ResendEmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<Option<SentEmail>> {
        let request = SendEmailRequest {
            from: self.from.to_string(),
            to: vec![email.recipient.to_string()],
            reply_to: email.reply_to.into_iter().collect(),
            subject: &email.subject,
            html: email.body.html.as_deref(),
            text: &email.body.text,
        };

        let response = self
            .client
            .post(self.endpoint.join("emails")?)
            .bearer_auth(&*self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "resend refused to accept email");
            return Ok(None);
        }

        let SendEmailResponse { id } = response
            .json()
            .await
            .context("Failed to parse resend response")?;

        Ok(Some(SentEmail { id }))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .get((*self.endpoint).clone())
            .send()
            .await
            .map(|_| ())
            .context("Failed to reach resend api")
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reply_to: Vec<String>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

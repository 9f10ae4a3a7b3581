use std::future::Future;

use anyhow::Context;
use portfolio_utils::http::HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Shown when the server rejects a submission without saying why.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to send message. Please try again later.";

#[cfg_attr(test, mockall::automock)]
pub trait SubmissionClient: Send + Sync {
    /// Submit a contact form to the server.
    fn send(
        &self,
        request: &ContactRequest,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send;
}

/// The contact form exactly as entered, including the hidden honeypot field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub honeypot: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub message: String,
    /// Identifier of the email sent by the server.
    pub id: Option<String>,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The server responded, but did not accept the submission.
    #[error("{}", .0.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE))]
    Rejected(Option<String>),
    /// The server could not be reached.
    #[error("Network error. Please check your connection and try again.")]
    Network(#[source] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    endpoint: Url,
    client: HttpClient,
}

impl HttpSubmissionClient {
    pub fn new(endpoint: Url) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint,
            client: HttpClient::new().context("Failed to create http client")?,
        })
    }
}

impl SubmissionClient for HttpSubmissionClient {
    async fn send(&self, request: &ContactRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                error!("Failed to submit contact form: {err}");
                SubmissionError::Network(err.into())
            })?;

        let status = response.status();
        let body = match response.json::<ApiResponse>().await {
            Ok(body) => body,
            Err(err) => {
                error!(%status, "Failed to parse contact form response: {err}");
                return Err(SubmissionError::Rejected(None));
            }
        };

        if !status.is_success() || !body.success {
            debug!(%status, error = ?body.error, "contact form rejected");
            return Err(SubmissionError::Rejected(body.error));
        }

        Ok(SubmissionReceipt {
            message: body.message.unwrap_or_default(),
            id: body.data.map(|data| data.id),
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    data: Option<ApiSentEmail>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ApiSentEmail {
    id: String,
}

use portfolio_models::{contact::ContactSubmission, email::SentEmail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiContactSubmission {
    /// Full name of the sender
    pub name: Option<String>,
    /// Email address of the sender
    pub email: Option<String>,
    /// Content of the message
    pub message: Option<String>,
    /// Hidden form field, must be left empty
    pub honeypot: Option<String>,
}

impl From<ApiContactSubmission> for ContactSubmission {
    fn from(value: ApiContactSubmission) -> Self {
        Self {
            name: value.name,
            email: value.email,
            message: value.message,
            honeypot: value.honeypot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiContactResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: ApiSentEmail,
}

#[derive(Debug, Serialize)]
pub struct ApiSentEmail {
    pub id: String,
}

impl From<SentEmail> for ApiSentEmail {
    fn from(value: SentEmail) -> Self {
        Self { id: value.id }
    }
}

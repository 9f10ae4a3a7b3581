use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use portfolio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use tracing::{debug, error};

use super::error;
use crate::{
    middlewares::client_address::ClientAddress,
    models::contact::{ApiContactResponse, ApiContactSubmission},
};

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/send-email", routing::post(send_email))
        .with_state(service)
}

async fn send_email(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(client): Extension<ClientAddress>,
    body: Bytes,
) -> Response {
    // parsed regardless of the content type, an unreadable body is handled
    // like an empty form
    let submission = serde_json::from_slice::<ApiContactSubmission>(&body).unwrap_or_else(|err| {
        debug!("failed to parse contact submission: {err}");
        ApiContactSubmission::default()
    });

    match service.submit(&client.0, submission.into()).await {
        Ok(sent) => Json(ApiContactResponse {
            success: true,
            message: "Email sent successfully",
            data: sent.into(),
        })
        .into_response(),
        Err(ContactSubmitError::NotConfigured) => {
            error!("contact form used without a configured email service");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Email service is not configured. Please check server configuration.",
            )
        }
        Err(ContactSubmitError::RateLimited) => error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        ),
        Err(ContactSubmitError::BotDetected) => error(StatusCode::BAD_REQUEST, "Invalid request"),
        Err(ContactSubmitError::MissingFields) => {
            error(StatusCode::BAD_REQUEST, "All fields are required")
        }
        Err(ContactSubmitError::InvalidEmail) => {
            error(StatusCode::BAD_REQUEST, "Invalid email format")
        }
        Err(ContactSubmitError::InvalidName) => error(
            StatusCode::BAD_REQUEST,
            "Name must be between 2 and 100 characters",
        ),
        Err(ContactSubmitError::InvalidMessage) => error(
            StatusCode::BAD_REQUEST,
            "Message must be between 10 and 2000 characters",
        ),
        Err(ContactSubmitError::Send) => {
            error!("email provider refused the contact message");
            send_failed()
        }
        Err(ContactSubmitError::Other(err)) => {
            error!("failed to send contact message: {err:#}");
            send_failed()
        }
    }
}

fn send_failed() -> Response {
    error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to send email. Please try again later.",
    )
}

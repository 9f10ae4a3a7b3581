//! Identify the client of each request for rate limiting

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use tracing::trace;

const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";
const REAL_IP_HEADER: &str = "X-Real-IP";

/// Shared by all clients that cannot be identified.
const UNKNOWN_CLIENT: &str = "unknown";

pub fn add<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    router.layer(from_fn(|mut request: Request, next: Next| {
        let client_address = ClientAddress::from_headers(request.headers());
        request.extensions_mut().insert(client_address);
        next.run(request)
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientAddress(pub String);

impl ClientAddress {
    fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let forwarded_for = header(FORWARDED_FOR_HEADER)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let address = forwarded_for
            .or_else(|| header(REAL_IP_HEADER))
            .unwrap_or(UNKNOWN_CLIENT);
        trace!(address, "identified client");

        Self(address.into())
    }
}

impl std::fmt::Display for ClientAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use survey_core::model::ClientId;
use tracing::debug;

pub const CLIENT_COOKIE: &str = "survey_client";

/// Read the client id from the `Cookie` headers, ignoring malformed values.
#[must_use]
pub fn client_from_headers(headers: &HeaderMap) -> Option<ClientId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CLIENT_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

#[must_use]
pub fn client_cookie(client: ClientId) -> String {
    format!("{CLIENT_COOKIE}={client}; Path=/; HttpOnly; SameSite=Lax")
}

/// Middleware attaching a `ClientId` extension to every request.
///
/// Requests without a usable cookie get a fresh id, returned to the browser
/// on the response.
pub async fn client_identity(mut request: Request, next: Next) -> Response {
    let existing = client_from_headers(request.headers());
    let client = existing.unwrap_or_else(ClientId::generate);
    request.extensions_mut().insert(client);

    let mut response = next.run(request).await;
    if existing.is_none() {
        debug!(%client, "issuing client cookie");
        if let Ok(value) = HeaderValue::from_str(&client_cookie(client)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

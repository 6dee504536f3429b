use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::core::error::ClassifiedError;

pub const APP_USER_AGENT: &str = "mc-publish/0.1.0";

pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(default_headers)
        .build()
}

/// Rate limits and server-side failures are worth retrying; everything else
/// needs someone to look at it.
pub fn is_soft_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Classify a status code and raw body into a [`ClassifiedError`].
///
/// The body is only inspected to decide whether a structured detail can be
/// attached; it never changes the soft/hard verdict.
pub fn classify(context: &str, status: u16, reason: Option<&str>, body: &str) -> ClassifiedError {
    let mut error_text = reason.unwrap_or("Unknown").to_string();
    let body = body.trim();
    if !body.is_empty() {
        error_text.push_str(", ");
        error_text.push_str(body);
    }

    let message = format!("{}: {} ({})", context, status, error_text);
    let error = ClassifiedError {
        soft: is_soft_status(status),
        message,
        detail: None,
    };

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(detail) if detail.is_object() || detail.is_array() => error.with_detail(detail),
        Ok(_) => error,
        Err(e) => {
            debug!("{} returned an unstructured error body: {}", context, e);
            error
        }
    }
}

/// Connection failures and timeouts never reached the platform, so they are
/// worth retrying. A status, when there is one, decides as usual.
pub fn is_soft_transport(error: &reqwest::Error) -> bool {
    match error.status() {
        Some(status) => is_soft_status(status.as_u16()),
        None => error.is_timeout() || error.is_connect() || error.is_body(),
    }
}

/// Classify a failure that happened before a status arrived or while the
/// body was being read.
pub fn classify_transport(context: &str, error: &reqwest::Error) -> ClassifiedError {
    ClassifiedError {
        soft: is_soft_transport(error),
        message: format!("{}: {}", context, error),
        detail: None,
    }
}

/// Send `request`, classifying transport failures.
pub async fn send(context: &str, request: RequestBuilder) -> Result<Response, ClassifiedError> {
    request.send().await.map_err(|e| classify_transport(context, &e))
}

/// Read the whole body of `response`, classifying transport failures.
pub async fn read_body(context: &str, response: Response) -> Result<String, ClassifiedError> {
    response.text().await.map_err(|e| classify_transport(context, &e))
}

/// Consume a non-success response and classify it.
pub async fn classify_response(context: &str, response: Response) -> ClassifiedError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify(context, status.as_u16(), status.canonical_reason(), &body)
}

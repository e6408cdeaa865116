use crate::errors::ServerError;
use crate::templates::components::error::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::{error, warn};

/// Renders an error for the path that produced it: JSON under `/api/`,
/// a login redirect for signed-out HTML requests, an HTML page otherwise.
pub fn error_to_response(err: ServerError, path: &str) -> Response {
    let status = err.status();
    if status >= 500 {
        error!(%path, error = %err, "request failed");
    } else {
        warn!(%path, status, error = %err, "request rejected");
    }

    if is_api_path(path) {
        let body = json!({ "error": err.public_message() }).to_string();
        return build(status, "application/json", body, None);
    }

    if let (ServerError::Unauthorized(_), Some(slug)) = (&err, store_slug(path)) {
        return build(303, "text/plain; charset=utf-8", String::new(), Some(format!("/s/{slug}/login")));
    }

    let page = error_page(status, &err.public_message()).into_string();
    build(status, "text/html; charset=utf-8", page, None)
}

fn build(status: u16, content_type: &str, body: String, location: Option<String>) -> Response {
    let mut builder = ResponseBuilder::new()
        .status(status)
        .header("Content-Type", content_type);
    if let Some(location) = location {
        builder = builder.header("Location", location);
    }
    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error".to_string())))
}

fn is_api_path(path: &str) -> bool {
    path.split('/').nth(3) == Some("api")
}

fn store_slug(path: &str) -> Option<&str> {
    let mut parts = path.split('/').skip(1);
    match (parts.next(), parts.next()) {
        (Some("s"), Some(slug)) if !slug.is_empty() => Some(slug),
        _ => None,
    }
}

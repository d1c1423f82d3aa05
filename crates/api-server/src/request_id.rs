use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one HTTP request. `request_id` is filled in by [`request_id_middleware`].
pub fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Reuses an incoming `X-Request-Id` (from a reverse proxy) or mints a UUID v4,
/// records it on the request span and echoes it on the response.
pub async fn request_id_middleware(headers: HeaderMap, request: Request, next: Next) -> Response {
    let id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", id.as_str());

    let mut response = next.run(request).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_span_declares_request_id() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let request = Request::builder()
                .uri("/api/analyze/BONK")
                .body(Body::empty())
                .unwrap();
            let span = make_request_span(&request);

            let metadata = span.metadata().expect("span enabled under registry");
            assert!(metadata.fields().field("request_id").is_some());
            assert!(metadata.fields().field("uri").is_some());
        });
    }
}

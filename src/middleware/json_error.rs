use axum::{
    body::{Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    response::{JsonApiResponse, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites plain-text error responses (extractor rejections, 405s, static
/// fallbacks) into the JSON error envelope. Browser requests keep theirs.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let wants_html = accepts_html(&req);
    let response = next.run(req).await;

    if !response.status().is_client_error() && !response.status().is_server_error() {
        return response;
    }

    if has_content_type(&response, is_json) || has_content_type(&response, is_html) || wants_html
    {
        return response;
    }

    let status = response.status();
    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => body_bytes_to_message(status, bytes),
        Err(_) => default_message(status),
    };
    let app_error = AppError::with_status(status, message);
    if status.is_server_error() {
        log_app_error(&app_error, status);
    }

    let mut new_response = JsonApiResponse::from_error(&app_error).into_response();
    copy_headers(&parts.headers, &mut new_response);
    new_response
}

fn accepts_html(req: &Request) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(is_html)
        .unwrap_or(false)
}

fn has_content_type(response: &Response, matches: fn(&str) -> bool) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(matches)
        .unwrap_or(false)
}

fn is_json(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    value.contains("application/json") || value.contains("+json")
}

fn is_html(value: &str) -> bool {
    value.to_ascii_lowercase().contains("text/html")
}

fn body_bytes_to_message(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        return default_message(status);
    }
    message
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn copy_headers(src: &HeaderMap, dest: &mut Response) {
    for (name, value) in src {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        dest.headers_mut().insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{self, Body},
        http::{Request, StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    use super::json_error_middleware;

    fn app() -> Router {
        Router::new()
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .route("/empty", get(|| async { StatusCode::BAD_GATEWAY }))
            .layer(middleware::from_fn(json_error_middleware))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app().oneshot(request).await.expect("request should succeed");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        (status, content_type, bytes.to_vec())
    }

    #[tokio::test]
    async fn wraps_plain_text_errors() {
        let (status, content_type, bytes) =
            send(Request::builder().uri("/teapot").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["status"], 418);
        assert_eq!(json["message"], "short and stout");
    }

    #[tokio::test]
    async fn empty_bodies_fall_back_to_reason_phrase() {
        let (status, _, bytes) =
            send(Request::builder().uri("/empty").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["message"], "Bad Gateway");
    }

    #[tokio::test]
    async fn browser_requests_are_left_alone() {
        let (status, content_type, bytes) = send(
            Request::builder()
                .uri("/teapot")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_ne!(content_type.as_deref(), Some("application/json"));
        assert_eq!(bytes, b"short and stout");
    }
}

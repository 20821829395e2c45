use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
};
use serde_json::{Map, Value};

use crate::{db::dao::EntityId, error::AppError};

/// Untyped request fields from a JSON object or an urlencoded form.
/// An empty body decodes to an empty map.
#[derive(Debug, Default)]
pub struct ItemPayload(pub Map<String, Value>);

impl<S> FromRequest<S> for ItemPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
            let fields = pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(Self(fields));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let Json(value) = Json::<Value>::from_bytes(&bytes)
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(AppError::bad_request("Request body must be a JSON object")),
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Numeric `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(pub EntityId);

impl<S> FromRequestParts<S> for ItemId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        raw.parse::<EntityId>()
            .map(Self)
            .map_err(|_| AppError::bad_request(format!("Invalid item id: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{Request, StatusCode, header},
    };
    use serde_json::Value;

    use super::ItemPayload;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<ItemPayload, StatusCode> {
        let mut builder = Request::builder().method("PUT").uri("/item/1");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).expect("request");
        ItemPayload::from_request(request, &())
            .await
            .map_err(|err| err.status())
    }

    #[tokio::test]
    async fn decodes_json_objects() {
        let ItemPayload(fields) = extract(Some("application/json"), r#"{"completed":true}"#)
            .await
            .expect("json object");
        assert_eq!(fields.get("completed"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn decodes_urlencoded_forms_as_strings() {
        let ItemPayload(fields) = extract(
            Some("application/x-www-form-urlencoded"),
            "name=Buy+milk&completed=1",
        )
        .await
        .expect("form body");
        assert_eq!(fields.get("name"), Some(&Value::String("Buy milk".into())));
        assert_eq!(fields.get("completed"), Some(&Value::String("1".into())));
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_map() {
        let ItemPayload(fields) = extract(None, "").await.expect("empty body");
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn non_object_json_is_a_bad_request() {
        assert_eq!(
            extract(Some("application/json"), "[1,2]").await.err(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            extract(Some("application/json"), "{not json").await.err(),
            Some(StatusCode::BAD_REQUEST)
        );
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::{
    db::dao::EntityId,
    db::entities::item,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::extract::{ItemId, ItemPayload},
    services::{ItemService, NewItem, ServiceContext},
    state::AppState,
};

/// Query parameter carrying the id of a just-created item to the next page.
pub const CREATED_PARAM: &str = "created";
/// Query parameter carrying a rejected form submission's message back.
pub const ERROR_PARAM: &str = "error";

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: EntityId,
    pub name: String,
    pub completed: bool,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            completed: model.completed,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedItem {
    pub id: EntityId,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route("/item/store", post(store_item))
        .route(
            "/item/{id}",
            get(show_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let items = item_service(&state).list().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

async fn store_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ItemPayload(fields): ItemPayload,
) -> Result<Response, AppError> {
    let wants_json = accepts_json(&headers);
    let new_item = match NewItem::from_fields(&fields) {
        Ok(new_item) => new_item,
        Err(errors) if !wants_json => {
            let err = AppError::from(errors);
            let location = failure_location(&headers, err.message());
            return Ok(Redirect::to(&location).into_response());
        }
        Err(errors) => return Err(errors.into()),
    };
    let created = item_service(&state).insert(&new_item).await?;

    if wants_json {
        return Ok((StatusCode::CREATED, Json(ItemResponse::from(created))).into_response());
    }

    let location = handoff_location(&headers, created.id);
    Ok(Redirect::to(&location).into_response())
}

async fn show_item(
    State(state): State<Arc<AppState>>,
    ItemId(id): ItemId,
) -> Result<Json<ItemResponse>, AppError> {
    let found = item_service(&state).find(id).await?;
    Ok(Json(found.into()))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    ItemId(id): ItemId,
    ItemPayload(fields): ItemPayload,
) -> Result<Json<ItemResponse>, AppError> {
    let updated = item_service(&state).update(id, &fields).await?;
    Ok(Json(updated.into()))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    ItemId(id): ItemId,
) -> ApiResult<DeletedItem> {
    let id = item_service(&state).delete(id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "Item successfully deleted", DeletedItem { id })
}

fn item_service(state: &AppState) -> ItemService {
    ServiceContext::from_state(state).item()
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

/// Path of the referring page (same-origin only) plus `?created=<id>`.
fn handoff_location(headers: &HeaderMap, id: EntityId) -> String {
    format!("{}?{CREATED_PARAM}={id}", referer_path(headers))
}

/// Path of the referring page plus the url-encoded `?error=<message>`.
fn failure_location(headers: &HeaderMap, message: &str) -> String {
    let query = serde_urlencoded::to_string([(ERROR_PARAM, message)]).unwrap_or_default();
    format!("{}?{query}", referer_path(headers))
}

fn referer_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
        .map(|uri| uri.path().to_string())
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::{accepts_json, failure_location, handoff_location};

    fn referer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn handoff_returns_to_the_referring_path() {
        assert_eq!(
            handoff_location(&referer("http://localhost:3000/?created=1"), 7),
            "/?created=7"
        );
        assert_eq!(
            handoff_location(&referer("https://example.com/lists/home"), 2),
            "/lists/home?created=2"
        );
    }

    #[test]
    fn handoff_defaults_to_root() {
        assert_eq!(handoff_location(&HeaderMap::new(), 3), "/?created=3");
        assert_eq!(handoff_location(&referer("not a uri"), 3), "/?created=3");
        assert_eq!(
            handoff_location(&referer("http://localhost//evil.example"), 3),
            "/?created=3"
        );
    }

    #[test]
    fn failure_location_encodes_the_message() {
        assert_eq!(
            failure_location(
                &referer("http://localhost:3000/lists?created=4"),
                "The name field is required."
            ),
            "/lists?error=The+name+field+is+required."
        );
        assert_eq!(
            failure_location(&HeaderMap::new(), "a&b=c"),
            "/?error=a%26b%3Dc"
        );
    }

    #[test]
    fn json_clients_are_detected_from_accept() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_json(&headers));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain"),
        );
        assert!(accepts_json(&headers));
    }
}

use std::{path::PathBuf, sync::Arc};

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::{
    db::{dao::EntityId, entities::item},
    response::log_app_error,
    services::ServiceContext,
    state::AppState,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
struct HomeItem {
    id: EntityId,
    name: String,
    completed: bool,
    completed_at: String,
    created_at: String,
}

impl From<item::Model> for HomeItem {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            completed: model.completed,
            completed_at: model
                .completed_at
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            created_at: model.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    project_name: String,
    items: Vec<HomeItem>,
    created: Option<HomeItem>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HomeQuery {
    created: Option<String>,
    error: Option<String>,
}

type HtmlError = (StatusCode, Html<String>);

pub fn router(state: Arc<AppState>) -> Router {
    let public_dir = resolve_public_dir(&state.config.general.public_dir);
    Router::new()
        .route("/", get(home))
        .route_service("/{*file}", ServeDir::new(public_dir))
        .with_state(state)
}

/// Uses the configured directory as-is when it exists or is absolute;
/// otherwise looks beside the executable, then in the crate root.
fn resolve_public_dir(configured: &str) -> PathBuf {
    let configured = PathBuf::from(configured);
    if configured.is_absolute() || configured.exists() {
        return configured;
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let candidate = exe_dir.join(&configured);
        if candidate.exists() {
            return candidate;
        }
    }

    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(configured)
}

async fn home(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, HtmlError> {
    let items = ServiceContext::from_state(state.as_ref())
        .item()
        .list()
        .await
        .map_err(|err| {
            log_app_error(&err, err.status());
            html_error(err.status(), "failed to load items")
        })?;

    let error = query
        .error
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());
    let rendered = render_home(items, parse_created(query.created.as_deref()), error)
        .map_err(|_| html_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to render home"))?;
    Ok(Html(rendered))
}

fn render_home(
    items: Vec<item::Model>,
    created: Option<EntityId>,
    error: Option<String>,
) -> askama::Result<String> {
    let items: Vec<HomeItem> = items.into_iter().map(HomeItem::from).collect();
    // only acknowledge ids that are actually on the page
    let created = created.and_then(|id| items.iter().find(|item| item.id == id).cloned());
    HomeTemplate {
        project_name: project_name(),
        items,
        created,
        error,
    }
    .render()
}

fn parse_created(raw: Option<&str>) -> Option<EntityId> {
    raw.and_then(|value| value.trim().parse().ok())
}

pub(crate) fn project_name() -> String {
    env!("CARGO_PKG_NAME")
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn html_error(status: StatusCode, message: &'static str) -> HtmlError {
    (status, Html(message.to_string()))
}

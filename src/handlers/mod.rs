use crate::models::view::{Page, Toast};
use crate::services::console::Console;
use crate::services::document::{ids, Document};
use crate::services::search::SearchController;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

// Templates
struct NavItem {
    slug: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "console.html")]
struct ConsoleTemplate {
    nav: Vec<NavItem>,
    visible: Page,
    app_name: String,
    app_version: String,
    stat_environment: String,
    health_status: String,
    stat_users_total: String,
    stat_users_active: String,
    stat_db_status: String,
    users_table_body: String,
    users_pagination: String,
    system_info_grid: String,
    config_info_grid: String,
    database_info_grid: String,
    database_stats_grid: String,
    toast: Option<Toast>,
}

impl ConsoleTemplate {
    fn from_document(doc: &Document) -> Self {
        let slot = |id: &str| doc.html(id).to_string();
        Self {
            nav: doc
                .nav()
                .iter()
                .map(|control| NavItem {
                    slug: control.page.as_str(),
                    label: control.page.label(),
                    active: control.active,
                })
                .collect(),
            visible: doc
                .sections()
                .iter()
                .find(|section| section.visible)
                .map(|section| section.page)
                .unwrap_or_default(),
            app_name: slot(ids::APP_NAME),
            app_version: slot(ids::APP_VERSION),
            stat_environment: slot(ids::STAT_ENVIRONMENT),
            health_status: slot(ids::HEALTH_STATUS),
            stat_users_total: slot(ids::STAT_USERS_TOTAL),
            stat_users_active: slot(ids::STAT_USERS_ACTIVE),
            stat_db_status: slot(ids::STAT_DB_STATUS),
            users_table_body: slot(ids::USERS_TABLE_BODY),
            users_pagination: slot(ids::USERS_PAGINATION),
            system_info_grid: slot(ids::SYSTEM_INFO_GRID),
            config_info_grid: slot(ids::CONFIG_INFO_GRID),
            database_info_grid: slot(ids::DATABASE_INFO_GRID),
            database_stats_grid: slot(ids::DATABASE_STATS_GRID),
            toast: doc.toast().cloned(),
        }
    }

    fn section_class(&self, slug: &str) -> &'static str {
        if self.visible.as_str() == slug {
            "page active"
        } else {
            "page"
        }
    }
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
struct ConfirmDeleteTemplate {
    id: i64,
}

// State
#[derive(Clone)]
pub struct AppState {
    pub console: Console,
    pub search: SearchController,
}

pub fn create_app(console: Console) -> Router {
    let search = SearchController::new(console.clone());
    let state = AppState { console, search };

    Router::new()
        .route("/", get(console_page))
        .route("/pages/:page", get(switch_page))
        .route("/users", get(load_users))
        .route("/users/refresh", get(refresh_users))
        .route("/users/search", post(search_users))
        .route("/users/:id/delete", get(confirm_delete_page).post(delete_user))
        .route("/fragments", get(fragments))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

// Routes
async fn console_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = ConsoleTemplate::from_document(&state.console.document().read());
    Html(template.render().unwrap_or_else(|_| "Template error".to_string()))
}

async fn switch_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> impl IntoResponse {
    match page.parse::<Page>() {
        Ok(page) => {
            state.console.switch_page(page).await;
            Redirect::to("/").into_response()
        }
        Err(e) => {
            warn!("{}", e);
            (StatusCode::NOT_FOUND, "Unknown page").into_response()
        }
    }
}

#[derive(Deserialize)]
struct UsersQuery {
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn load_users(
    State(state): State<AppState>,
    Query(params): Query<UsersQuery>,
) -> impl IntoResponse {
    let current = state.console.view_state();
    let page = params.page.unwrap_or(current.current_user_page());
    let page_size = params
        .page_size
        .unwrap_or(current.current_user_page_size());

    state.console.load_users(page, page_size).await;
    Redirect::to("/")
}

async fn refresh_users(State(state): State<AppState>) -> impl IntoResponse {
    state.console.refresh_users().await;
    Redirect::to("/")
}

#[derive(Deserialize)]
struct SearchForm {
    #[serde(default)]
    keyword: String,
}

async fn search_users(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> impl IntoResponse {
    // A submitted form waits for its search so the redirect shows the results
    if let Some(pending) = state.search.on_input(&form.keyword).await {
        if let Err(e) = pending.await {
            warn!("Search task failed: {}", e);
        }
    }
    Redirect::to("/")
}

async fn confirm_delete_page(Path(id): Path<i64>) -> impl IntoResponse {
    let template = ConfirmDeleteTemplate { id };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string()))
}

#[derive(Deserialize)]
struct DeleteForm {
    confirm: Option<String>,
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> impl IntoResponse {
    let confirmed = form.confirm.as_deref() == Some("yes");
    state
        .console
        .delete_user(id, &move |_: &str| confirmed)
        .await;
    Redirect::to("/")
}

async fn fragments(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.console.document().read().snapshot();
    Json(snapshot)
}

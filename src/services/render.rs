//! Pure transforms from backend payloads to view models and markup.
//!
//! Nothing here touches the document. Markup comes from the askama templates
//! under `templates/fragments/`, which escape every field they print.

use crate::models::api::{
    ConfigInfo, DatabaseHealth, DatabaseStats, HealthStatus, OverviewStats, PagedList, SystemInfo,
    UserRecord,
};
use crate::utils::format::{format_date, MISSING};
use askama::Template;
use tracing::warn;

pub const USER_COLUMNS: usize = 6;
const NOT_CONFIGURED: &str = "Not configured";

// Templates
#[derive(Template)]
#[template(path = "fragments/users_rows.html")]
struct UsersRowsTemplate<'a> {
    rows: &'a [UserRow],
    columns: usize,
}

#[derive(Template)]
#[template(path = "fragments/pagination.html")]
struct PaginationTemplate<'a> {
    view: &'a PaginationView,
}

#[derive(Template)]
#[template(path = "fragments/info_grid.html")]
struct InfoGridTemplate<'a> {
    items: &'a [InfoItem],
}

#[derive(Template)]
#[template(path = "fragments/health_status.html")]
struct HealthStatusTemplate {
    badges: [StatusBadge; 2],
}

fn render_fragment<T: Template>(template: &T) -> String {
    template.render().unwrap_or_else(|e| {
        warn!("Fragment template failed: {}", e);
        String::new()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub created_at: String,
}

impl UserRow {
    pub fn badge_class(&self) -> &'static str {
        if self.active {
            "healthy"
        } else {
            "unhealthy"
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

pub fn user_rows(list: &PagedList<UserRecord>, date_format: &str) -> Vec<UserRow> {
    list.items
        .iter()
        .map(|user| UserRow {
            id: user.id,
            username: user.username.clone().unwrap_or_else(|| MISSING.to_string()),
            email: user.email.clone().unwrap_or_else(|| MISSING.to_string()),
            active: user.is_active,
            created_at: format_date(user.created_at.as_deref(), date_format),
        })
        .collect()
}

/// Table body for the user list; a single placeholder row when empty.
pub fn render_users(list: &PagedList<UserRecord>, date_format: &str) -> String {
    let rows = user_rows(list, date_format);
    render_fragment(&UsersRowsTemplate {
        rows: &rows,
        columns: USER_COLUMNS,
    })
}

/// Target of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub page_size: u32,
}

impl PageLink {
    pub fn href(&self) -> String {
        format!("/users?page={}&page_size={}", self.page, self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
    pub summary: String,
}

/// `None` when the list fits on a single page and no controls are shown.
pub fn pagination_view<T>(list: &PagedList<T>) -> Option<PaginationView> {
    if !list.has_prev && !list.has_next {
        return None;
    }

    let link = |page: u32| PageLink {
        page,
        page_size: list.page_size,
    };

    Some(PaginationView {
        previous: list.has_prev.then(|| link(list.page.saturating_sub(1).max(1))),
        next: list.has_next.then(|| link(list.page.saturating_add(1))),
        summary: format!(
            "Page {} / {} ({} total)",
            list.page, list.total_pages, list.total
        ),
    })
}

pub fn render_pagination<T>(list: &PagedList<T>) -> String {
    match pagination_view(list) {
        Some(view) => render_fragment(&PaginationTemplate { view: &view }),
        None => String::new(),
    }
}

/// Health indicator shown in the overview and the database grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub healthy: bool,
    pub text: String,
}

impl StatusBadge {
    fn new(healthy: bool, text: impl Into<String>) -> Self {
        Self {
            healthy,
            text: text.into(),
        }
    }

    pub fn class(&self) -> &'static str {
        if self.healthy {
            "healthy"
        } else {
            "unhealthy"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    Text(String),
    Badge(StatusBadge),
    /// Inline error text, highlighted.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoItem {
    pub label: &'static str,
    pub value: InfoValue,
}

impl InfoItem {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: InfoValue::Text(value.into()),
        }
    }
}

pub fn render_info_grid(items: &[InfoItem]) -> String {
    render_fragment(&InfoGridTemplate { items })
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "On"
    } else {
        "Off"
    }
}

fn connected(flag: bool) -> &'static str {
    if flag {
        "Connected"
    } else {
        "Disconnected"
    }
}

fn or_missing(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING.to_string())
}

fn or_not_configured(value: &Option<String>) -> String {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_CONFIGURED.to_string())
}

pub fn system_info_items(info: &SystemInfo, date_format: &str) -> Vec<InfoItem> {
    vec![
        InfoItem::text("Application", or_missing(&info.app_name)),
        InfoItem::text("Version", or_missing(&info.version)),
        InfoItem::text("Environment", or_missing(&info.environment)),
        InfoItem::text("Debug mode", on_off(info.debug)),
        InfoItem::text("Host", or_missing(&info.host)),
        InfoItem::text(
            "Port",
            info.port.map_or_else(|| MISSING.to_string(), |p| p.to_string()),
        ),
        InfoItem::text("Log level", or_missing(&info.log_level)),
        InfoItem::text("Log format", or_missing(&info.log_format)),
        InfoItem::text(
            "Current time",
            format_date(info.current_time.as_deref(), date_format),
        ),
    ]
}

/// Connection URLs are shown as the backend reports them.
pub fn config_info_items(config: &ConfigInfo) -> Vec<InfoItem> {
    let cors = config
        .cors_origins
        .as_ref()
        .filter(|origins| !origins.is_empty())
        .map_or_else(|| MISSING.to_string(), |origins| origins.join(", "));

    vec![
        InfoItem::text("Database URL", or_not_configured(&config.database_url)),
        InfoItem::text("Redis URL", or_not_configured(&config.redis_url)),
        InfoItem::text("Celery broker", or_not_configured(&config.celery_broker_url)),
        InfoItem::text(
            "Flower port",
            config
                .flower_port
                .map_or_else(|| MISSING.to_string(), |p| p.to_string()),
        ),
        InfoItem::text(
            "Flower auth",
            if config.has_flower_auth {
                "Configured"
            } else {
                NOT_CONFIGURED
            },
        ),
        InfoItem::text("CORS origins", cors),
    ]
}

/// Overview badges for overall and database health.
pub fn render_health_status(health: &HealthStatus) -> String {
    let database = health.database.clone().unwrap_or_default();
    let system = if health.is_healthy() {
        "System: healthy"
    } else {
        "System: unhealthy"
    };
    let db = if database.is_connected() {
        "Database: connected"
    } else {
        "Database: disconnected"
    };

    render_fragment(&HealthStatusTemplate {
        badges: [
            StatusBadge::new(health.is_healthy(), system),
            StatusBadge::new(database.healthy, db),
        ],
    })
}

pub fn database_health_items(health: &HealthStatus) -> Vec<InfoItem> {
    let database: DatabaseHealth = health.database.clone().unwrap_or_default();
    let status = if database.is_connected() {
        "Connected".to_string()
    } else {
        database
            .status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let mut items = vec![InfoItem {
        label: "Connection",
        value: InfoValue::Badge(StatusBadge::new(database.healthy, status)),
    }];
    if let Some(error) = database.error.filter(|e| !e.is_empty()) {
        items.push(InfoItem {
            label: "Error",
            value: InfoValue::Error(error),
        });
    }
    items
}

pub fn database_stats_items(stats: &DatabaseStats) -> Vec<InfoItem> {
    let mut items = vec![
        InfoItem::text("Connection", connected(stats.connected)),
        InfoItem::text(
            "Database type",
            stats
                .database_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        InfoItem::text("Tables", stats.tables_count.unwrap_or(0).to_string()),
    ];
    if let Some(error) = stats.error.clone().filter(|e| !e.is_empty()) {
        items.push(InfoItem {
            label: "Error",
            value: InfoValue::Error(error),
        });
    }
    items
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewStatsView {
    pub users_total: String,
    pub users_active: String,
    pub database: &'static str,
}

pub fn overview_stats(stats: &OverviewStats) -> OverviewStatsView {
    let users = stats.users.clone().unwrap_or_default();
    OverviewStatsView {
        users_total: users.total.to_string(),
        users_active: users.active.to_string(),
        database: connected(stats.database.as_ref().is_some_and(|db| db.connected)),
    }
}

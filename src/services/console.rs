use crate::models::api::{PagedList, UserRecord};
use crate::models::config::ConsoleConfig;
use crate::models::view::{Page, ViewState};
use crate::services::api_client::{ApiClient, ApiError, ApiResult};
use crate::services::document::{ids, Document};
use crate::services::notifier::Notifier;
use crate::services::render;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

const LOAD_FAILED: &str = "Failed to load data";
const USERS_FAILED: &str = "Failed to load user list";
const SEARCH_FAILED: &str = "Failed to search users";
const SYSTEM_FAILED: &str = "Failed to load system info";
const DATABASE_FAILED: &str = "Failed to load database info";
const DELETE_FAILED: &str = "Failed to delete user";
const DELETE_PROMPT: &str = "Delete this user?";

/// Gate in front of destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What a user-list request was for.
#[derive(Debug, Clone)]
enum UsersQuery {
    List { page: u32, page_size: u32 },
    Search { keyword: String, page_size: u32 },
}

/// Navigation controller and page loaders.
///
/// Owns the view state and writes rendered fragments into the shared
/// [`Document`]. Loaders never return errors: transport failures are
/// reported through the [`Notifier`] once per section.
#[derive(Clone)]
pub struct Console {
    client: Arc<dyn ApiClient>,
    document: Arc<RwLock<Document>>,
    state: Arc<Mutex<ViewState>>,
    notifier: Notifier,
    settings: ConsoleConfig,
}

impl Console {
    pub fn new(client: Arc<dyn ApiClient>, settings: ConsoleConfig) -> Self {
        let document = Arc::new(RwLock::new(Document::new()));
        let notifier = Notifier::new(Arc::clone(&document), settings.toast_duration());
        Self {
            client,
            state: Arc::new(Mutex::new(ViewState::new(settings.default_page_size))),
            document,
            notifier,
            settings,
        }
    }

    pub fn document(&self) -> Arc<RwLock<Document>> {
        Arc::clone(&self.document)
    }

    pub fn view_state(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn settings(&self) -> &ConsoleConfig {
        &self.settings
    }

    /// Activates `target` and reloads its data, even when it is already the
    /// current page.
    pub async fn switch_page(&self, target: Page) {
        self.document.write().activate(target);
        self.state.lock().set_current_page(target);
        debug!(page = %target, "Switched page");

        match target {
            Page::Overview => self.load_overview().await,
            Page::Users => self.refresh_users().await,
            Page::System => self.load_system_info().await,
            Page::Database => self.load_database_info().await,
        }
    }

    pub async fn load_overview(&self) {
        let (health, stats, info) = futures::join!(
            self.client.system_health(),
            self.client.stats_overview(),
            self.client.system_info(),
        );
        let mut failure: Option<ApiError> = None;

        match health {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(health) => {
                        let html = render::render_health_status(&health);
                        self.document.write().set_html(ids::HEALTH_STATUS, html);
                    }
                    Err(failure) => warn!(%failure, "Health check rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        match stats {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(stats) => {
                        let view = render::overview_stats(&stats);
                        let mut doc = self.document.write();
                        doc.set_text(ids::STAT_USERS_TOTAL, &view.users_total);
                        doc.set_text(ids::STAT_USERS_ACTIVE, &view.users_active);
                        doc.set_text(ids::STAT_DB_STATUS, view.database);
                    }
                    Err(failure) => warn!(%failure, "Overview stats rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        match info {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(info) => {
                        let mut doc = self.document.write();
                        doc.set_text(ids::APP_NAME, info.app_name.as_deref().unwrap_or_default());
                        doc.set_text(
                            ids::APP_VERSION,
                            &format!("v{}", info.version.as_deref().unwrap_or_default()),
                        );
                        doc.set_text(
                            ids::STAT_ENVIRONMENT,
                            info.environment.as_deref().unwrap_or_default(),
                        );
                    }
                    Err(failure) => warn!(%failure, "System info rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        if let Some(err) = failure {
            self.notifier
                .report_failure("Failed to load overview", &err, LOAD_FAILED);
        }
    }

    /// Loads a page of the unfiltered user list and records it as the
    /// current page once the backend confirms it.
    pub async fn load_users(&self, page: u32, page_size: u32) {
        let query = UsersQuery::List {
            page: page.max(1),
            page_size: page_size.max(1),
        };
        self.fetch_users(query).await;
    }

    /// Reloads whatever page of the user list is current.
    pub async fn refresh_users(&self) {
        let (page, page_size) = {
            let state = self.state.lock();
            (state.current_user_page(), state.current_user_page_size())
        };
        self.load_users(page, page_size).await;
    }

    /// Keyword search. Always asks for page 1 at the current page size and
    /// leaves the recorded user page alone.
    pub async fn search_users(&self, keyword: &str) {
        let page_size = self.state.lock().current_user_page_size();
        let query = UsersQuery::Search {
            keyword: keyword.to_string(),
            page_size,
        };
        self.fetch_users(query).await;
    }

    async fn fetch_users(&self, query: UsersQuery) {
        let token = self.state.lock().begin_users_request();

        let (result, failed): (ApiResult<PagedList<UserRecord>>, &str) = match &query {
            UsersQuery::List { page, page_size } => {
                (self.client.list_users(*page, *page_size).await, USERS_FAILED)
            }
            UsersQuery::Search { keyword, page_size } => (
                self.client.search_users(keyword, 1, *page_size).await,
                SEARCH_FAILED,
            ),
        };

        if !self.state.lock().is_latest_users_request(token) {
            debug!(?query, "Discarding stale user list response");
            return;
        }

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                self.notifier.report_failure(failed, &err, failed);
                return;
            }
        };

        let list = match envelope.into_result() {
            Ok(list) => list,
            Err(failure) => {
                warn!(%failure, ?query, "User list request rejected");
                self.notifier.error(failure.message_or(failed));
                return;
            }
        };

        {
            let mut state = self.state.lock();
            if !state.is_latest_users_request(token) {
                debug!(?query, "User list superseded while decoding");
                return;
            }
            if let UsersQuery::List { page, page_size } = query {
                state.set_user_page(page, page_size);
            }
        }

        let body = render::render_users(&list, &self.settings.date_format);
        let pagination = render::render_pagination(&list);
        let mut doc = self.document.write();
        doc.set_html(ids::USERS_TABLE_BODY, body);
        doc.set_html(ids::USERS_PAGINATION, pagination);
    }

    /// Deletes a user after `confirm` agrees, then reloads the current page.
    pub async fn delete_user(&self, id: i64, confirm: &(dyn Confirm + Sync)) {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id, "User deletion cancelled");
            return;
        }

        let envelope = match self.client.delete_user(id).await {
            Ok(envelope) => envelope,
            Err(err) => {
                self.notifier
                    .report_failure("Failed to delete user", &err, DELETE_FAILED);
                return;
            }
        };

        if envelope.is_success() {
            info!(id, "User deleted");
            self.notifier.success("User deleted");
            self.refresh_users().await;
        } else {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DELETE_FAILED.to_string());
            warn!(id, code = envelope.code, %message, "User deletion rejected");
            self.notifier.error(message);
        }
    }

    pub async fn load_system_info(&self) {
        let (info, config) =
            futures::join!(self.client.system_info(), self.client.config_info());
        let mut failure: Option<ApiError> = None;

        match info {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(info) => {
                        let items = render::system_info_items(&info, &self.settings.date_format);
                        self.document
                            .write()
                            .set_html(ids::SYSTEM_INFO_GRID, render::render_info_grid(&items));
                    }
                    Err(failure) => warn!(%failure, "System info rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        match config {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(config) => {
                        let items = render::config_info_items(&config);
                        self.document
                            .write()
                            .set_html(ids::CONFIG_INFO_GRID, render::render_info_grid(&items));
                    }
                    Err(failure) => warn!(%failure, "Config info rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        if let Some(err) = failure {
            self.notifier.report_failure(SYSTEM_FAILED, &err, SYSTEM_FAILED);
        }
    }

    pub async fn load_database_info(&self) {
        let (health, stats) =
            futures::join!(self.client.system_health(), self.client.database_stats());
        let mut failure: Option<ApiError> = None;

        match health {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(health) => {
                        let items = render::database_health_items(&health);
                        self.document
                            .write()
                            .set_html(ids::DATABASE_INFO_GRID, render::render_info_grid(&items));
                    }
                    Err(failure) => warn!(%failure, "Health check rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        match stats {
            Ok(envelope) => {
                match envelope.into_result() {
                    Ok(stats) => {
                        let items = render::database_stats_items(&stats);
                        self.document
                            .write()
                            .set_html(ids::DATABASE_STATS_GRID, render::render_info_grid(&items));
                    }
                    Err(failure) => warn!(%failure, "Database stats rejected"),
                }
            }
            Err(err) => failure = failure.or(Some(err)),
        }

        if let Some(err) = failure {
            self.notifier
                .report_failure(DATABASE_FAILED, &err, DATABASE_FAILED);
        }
    }
}

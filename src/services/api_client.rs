use crate::models::api::{
    ConfigInfo, DatabaseStats, Envelope, HealthStatus, OverviewStats, PagedList, SystemInfo,
    UserRecord,
};
use crate::models::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub type ApiResult<T> = Result<Envelope<T>, ApiError>;

/// Transport-level failures. Domain failures arrive inside an [`Envelope`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("response from {url} (HTTP {status}) is not a JSON envelope: {source}")]
    Decode {
        url: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Backend endpoints the console reads from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn system_health(&self) -> ApiResult<HealthStatus>;

    async fn stats_overview(&self) -> ApiResult<OverviewStats>;

    async fn system_info(&self) -> ApiResult<SystemInfo>;

    async fn config_info(&self) -> ApiResult<ConfigInfo>;

    async fn database_stats(&self) -> ApiResult<DatabaseStats>;

    async fn list_users(&self, page: u32, page_size: u32) -> ApiResult<PagedList<UserRecord>>;

    async fn search_users(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> ApiResult<PagedList<UserRecord>>;

    async fn delete_user(&self, id: i64) -> ApiResult<serde_json::Value>;
}

pub struct HttpApiClient {
    client: reqwest::Client,
    base: String,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("admin-console/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let base = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.base_path.trim_matches('/')
        );

        Ok(Self {
            client: builder.build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Builds `{base_url}{base_path}{path}` with url-encoded query pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base, path);
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        parsed.map_err(|e| ApiError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, url: Url) -> ApiResult<T> {
        debug!(%method, %url, "Backend request");
        let response = self.client.request(method, url.clone()).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            status: status.as_u16(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let url = self.endpoint(path, query)?;
        self.request(Method::GET, url).await
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn system_health(&self) -> ApiResult<HealthStatus> {
        self.get("/admin/system/health", &[]).await
    }

    async fn stats_overview(&self) -> ApiResult<OverviewStats> {
        self.get("/admin/stats/overview", &[]).await
    }

    async fn system_info(&self) -> ApiResult<SystemInfo> {
        self.get("/admin/system/info", &[]).await
    }

    async fn config_info(&self) -> ApiResult<ConfigInfo> {
        self.get("/admin/config/info", &[]).await
    }

    async fn database_stats(&self) -> ApiResult<DatabaseStats> {
        self.get("/admin/database/stats", &[]).await
    }

    async fn list_users(&self, page: u32, page_size: u32) -> ApiResult<PagedList<UserRecord>> {
        self.get(
            "/users",
            &[("page", page.to_string()), ("page_size", page_size.to_string())],
        )
        .await
    }

    async fn search_users(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> ApiResult<PagedList<UserRecord>> {
        self.get(
            "/users/search",
            &[
                ("keyword", keyword.to_string()),
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ],
        )
        .await
    }

    async fn delete_user(&self, id: i64) -> ApiResult<serde_json::Value> {
        let url = self.endpoint(&format!("/users/{id}"), &[])?;
        self.request(Method::DELETE, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn client_for(base_url: &str) -> HttpApiClient {
        HttpApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    #[test]
    fn endpoint_joins_base_path_and_encodes_keyword() {
        let client = client_for("http://backend:8000/");
        let url = client
            .endpoint(
                "/users/search",
                &[("keyword", "a b&c<".to_string()), ("page", "1".to_string())],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://backend:8000/api/v1/users/search?keyword=a+b%26c%3C&page=1"
        );
    }

    #[test]
    fn endpoint_rejects_unparseable_base() {
        let client = client_for("not a url");
        assert!(matches!(
            client.endpoint("/users", &[]),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn error_status_with_envelope_body_is_a_domain_failure() {
        let router = Router::new().route(
            "/api/v1/users",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"code": 500, "message": "x", "data": null})),
                )
            }),
        );
        let client = client_for(&serve(router).await);

        let envelope = assert_ok!(client.list_users(1, 10).await);
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.message.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let router = Router::new().route("/api/v1/admin/system/health", get(|| async { "<html>" }));
        let client = client_for(&serve(router).await);

        let err = assert_err!(client.system_health().await);
        assert!(matches!(err, ApiError::Decode { status: 200, .. }));
    }

    #[tokio::test]
    async fn delete_hits_user_path() {
        let router = Router::new().route(
            "/api/v1/users/42",
            axum::routing::delete(|| async { Json(json!({"code": 200, "message": "deleted"})) }),
        );
        let client = client_for(&serve(router).await);

        let envelope = assert_ok!(client.delete_user(42).await);
        assert!(envelope.is_success());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUCCESS_CODE: i64 = 200;

/// Uniform wrapper returned by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[cfg(test)]
impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Splits the envelope into its payload or the domain failure it reports.
    /// A success code without a payload counts as a failure.
    pub fn into_result(self) -> Result<T, DomainFailure> {
        match (self.code, self.data) {
            (SUCCESS_CODE, Some(data)) => Ok(data),
            (code, _) => Err(DomainFailure {
                code,
                message: self.message,
            }),
        }
    }
}

/// A well-formed response saying the operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    pub code: i64,
    pub message: Option<String>,
}

impl DomainFailure {
    /// The server message when it sent a non-blank one, otherwise `fallback`.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
    }
}

impl fmt::Display for DomainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message_or("no message"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: Option<DatabaseHealth>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: Option<String>,
    #[serde(default)]
    pub healthy: bool,
    pub error: Option<String>,
}

impl DatabaseHealth {
    pub fn is_connected(&self) -> bool {
        self.status.as_deref() == Some("connected")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewStats {
    pub users: Option<UserCounts>,
    pub database: Option<Connectivity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connectivity {
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub app_name: Option<String>,
    pub version: Option<String>,
    pub environment: Option<String>,
    #[serde(default)]
    pub debug: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub current_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub celery_broker_url: Option<String>,
    pub flower_port: Option<u16>,
    #[serde(default)]
    pub has_flower_auth: bool,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseStats {
    #[serde(default)]
    pub connected: bool,
    pub database_type: Option<String>,
    pub tables_count: Option<u64>,
    pub error: Option<String>,
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "ADMIN_CONSOLE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub console: ConsoleConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `config.toml` / `config.json` from the working directory when
    /// present, then applies `ADMIN_CONSOLE__SECTION__KEY` overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub base_path: String,
    /// Transport timeout. Unset means whatever the HTTP stack does.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            base_path: "/api/v1".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub default_page_size: u32,
    pub search_debounce_ms: u64,
    pub toast_duration_ms: u64,
    pub date_format: String,
}

impl ConsoleConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            search_debounce_ms: 500,
            toast_duration_ms: 3000,
            date_format: "%Y/%-m/%-d %H:%M:%S".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            json_file: true,
        }
    }
}

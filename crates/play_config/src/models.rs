// --- File: crates/play_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,      // e.g. mongodb://localhost:27017, via PLAY__DATABASE__URL
    pub database: String, // e.g. "catalog", via PLAY__DATABASE__DATABASE
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub max_pool_size: Option<u32>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub server_selection_timeout_secs: Option<u64>,
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Top-level dashboard settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub account: AccountSettings,
}

/// Where bookmark and task records are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// SQLite file path. `None` places `startpage.db` in the platform data dir.
    pub database_path: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

/// External calendar feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarSettings {
    /// Feed endpoint. An empty value disables the calendar.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Local account used by the built-in identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountSettings {
    pub profile: Option<Identity>,
    /// Access token handed out on sign-in and cached until sign-out.
    pub access_token: Option<String>,
    /// Credential cache file. `None` places `credential.json` in the platform data dir.
    pub credential_path: Option<String>,
}

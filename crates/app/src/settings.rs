//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file given with `--config`), then overridden by
//! `BELANJA__*` environment variables, e.g. `BELANJA__TELEGRAM__TOKEN`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// IANA zone name used for "today" and for displayed dates.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            timezone: default_timezone(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "Asia/Kuala_Lumpur".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub database: Database,
    pub telegram: Telegram,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("BELANJA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/flowledger.toml";

/// Primary-store location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 3000,
            database: Database::Memory,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Mirror {
    /// Base URL of the transaction-mirror service. The single external
    /// configuration value of the audit surface.
    pub base_url: String,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub mirror: Mirror,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("FLOWLEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("FLOWLEDGER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

//! Settings of the `shopnet` binary.
//!
//! Values are layered: defaults, then the optional TOML file (`settings.toml`
//! unless `--config` says otherwise), then `SHOPNET_*` environment variables
//! (`SHOPNET_APP__LEVEL=debug`), then the command line flags.
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

pub const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    /// Log level of the binary and of the engine.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    #[default]
    Memory,
    /// Path of a sqlite file, created when missing.
    Sqlite(String),
    /// Full connection string, used as is.
    Url(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("SHOPNET").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(url) = &cli.database_url {
            settings.database = Database::Url(url.clone());
        }
        if let Some(level) = &cli.level {
            settings.app.level = level.clone();
        }
        Ok(settings)
    }

    /// Filter directive for `tracing-subscriber`.
    pub fn log_filter(&self) -> String {
        format!("shopnet={level},engine={level}", level = self.app.level)
    }
}

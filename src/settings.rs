use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

use crate::db::DEFAULT_DB_PATH;
use crate::parser::contacts::Correlation;

const DEFAULT_CONFIG_NAME: &str = "contacts";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub correlation: Correlation,
    pub user_agent: String,
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            correlation: Correlation::default(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load settings from an explicit file, or from an optional `contacts.toml`
/// in the working directory.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let source = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };
    Config::builder()
        .add_source(source)
        .build()
        .and_then(|c| c.try_deserialize())
        .with_context(|| match path {
            Some(p) => format!("Failed to load config from {}", p.display()),
            None => "Failed to load contacts.toml".to_string(),
        })
}

use crate::clipboard::ClipboardMode;
use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_CLIPBOARD: {0}")]
    Clipboard(String),
}

/// Startup settings read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub clipboard: ClipboardMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let clipboard = match env::var("APP_CLIPBOARD") {
            Ok(value) => value.parse().map_err(ConfigError::Clipboard)?,
            Err(_) => ClipboardMode::Browser,
        };

        Ok(Self {
            port,
            data_path,
            clipboard,
        })
    }
}

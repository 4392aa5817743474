use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

pub const APP_NAME: &str = "unsapark";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const MOCK_PAGE_SIZE: usize = 5;

pub const ENV_API_URL: &str = "UNSAPARK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "UNSAPARK_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "UNSAPARK_DATA_DIR";
pub const ENV_DNI: &str = "UNSAPARK_DNI";
pub const ENV_PASSWORD: &str = "UNSAPARK_PASSWORD";

pub fn get_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn get_session_file_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("session.json")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Live backend root. `None` selects the in-memory mock store.
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECONDS,
            data_dir: get_data_dir(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("Loaded environment from {:?}", path);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).map(|v| v.trim().to_string()) {
            if !url.is_empty() {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(AppError::Config(format!(
                        "{} must be an http(s) URL, got '{}'",
                        ENV_API_URL, url
                    )));
                }
                config.api_base_url = Some(url.trim_end_matches('/').to_string());
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))
            })?;
        }

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn uses_mock(&self) -> bool {
        self.api_base_url.is_none()
    }

    pub fn session_file(&self) -> PathBuf {
        get_session_file_path(&self.data_dir)
    }
}

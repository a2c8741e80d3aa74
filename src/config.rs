//! Uploader configuration loaded from the environment.

use std::env;

use crate::error::AppError;
use crate::services::chunk_manager::CHUNK_SIZE;
use crate::services::retry_engine::RetryPolicy;

/// Base URL used when `API_URL` is not set (local development backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

const CHUNK_UPLOAD_PATH: &str = "/chunk_files/upload";
const SINGLE_UPLOAD_PATH: &str = "/chunk_files/single";

#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,

    /// Chunk size in bytes. Always `CHUNK_SIZE` outside of tests.
    pub(crate) chunk_size: u64,

    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,

    pub retry: RetryPolicy,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chunk_size: CHUNK_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

impl UploaderConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let default = Self::default();

        Self {
            api_url: env::var("API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| normalize_base_url(&v))
                .unwrap_or(default.api_url),

            request_timeout_secs: env::var("UPLOAD_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_timeout_secs),

            ..default
        }
    }

    /// Replace the base URL, e.g. from a command-line override.
    pub fn with_api_url(mut self, api_url: &str) -> crate::error::Result<Self> {
        if api_url.trim().is_empty() {
            return Err(AppError::Config("API URL must not be empty".into()));
        }
        self.api_url = normalize_base_url(api_url);
        Ok(self)
    }

    pub fn chunk_upload_url(&self) -> String {
        format!("{}{}", self.api_url, CHUNK_UPLOAD_PATH)
    }

    pub fn single_upload_url(&self) -> String {
        format!("{}{}", self.api_url, SINGLE_UPLOAD_PATH)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

use crate::error::ClientError;
use directories::BaseDirs;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ClientConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        let request_timeout_secs = match env::var("TASKFORGE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "TASKFORGE_REQUEST_TIMEOUT_SECS must be a number, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: env::var("TASKFORGE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            session_file: env::var("TASKFORGE_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_file()),
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn default_session_file() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("taskforge").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./taskforge-session.json"))
}

//! Client settings from the environment, with `.env` loaded first when
//! present.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_NICKNAME_FILE: &str = ".student-nickname";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub nickname_file: PathBuf,
}

impl ClientConfig {
    /// Read configuration from the environment, loading `.env` first when
    /// one exists.
    pub fn from_env() -> Self {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_vars(
            env::var("QUIZ_API_BASE_URL").ok(),
            env::var("QUIZ_NICKNAME_FILE").ok(),
        )
    }

    fn from_vars(base_url: Option<String>, nickname_file: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            nickname_file: nickname_file
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NICKNAME_FILE)),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}

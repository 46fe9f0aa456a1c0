use std::{env, path::PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_DB_PATH: &str = "cashless_db";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub db_path: PathBuf,
}

impl ClientConfig {
    /// Reads `CASHLESS_API_URL` and `CASHLESS_DB_PATH`. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honored.
    pub fn from_env() -> Self {
        let api_url = env::var("CASHLESS_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL.to_string());
        let db_path = env::var("CASHLESS_DB_PATH").unwrap_or(DEFAULT_DB_PATH.to_string());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            db_path: PathBuf::from(db_path),
        }
    }
}

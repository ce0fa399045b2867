use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Origins allowed to call the HTTP API from a browser.
    pub allowed_origins: Vec<String>,
    /// Upper bound on a single archive append/read, in milliseconds.
    pub archive_timeout_ms: u64,
}

impl Config {
    fn parse_origins(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    fn default_origins() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ]
    }

    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|value| Self::parse_origins(&value))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(Self::default_origins);

        let archive_timeout_ms = env::var("ARCHIVE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5_000);

        Ok(Self {
            database_url,
            port,
            allowed_origins,
            archive_timeout_ms,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            port: 3000,
            allowed_origins: Self::default_origins(),
            archive_timeout_ms: 5_000,
        }
    }
}

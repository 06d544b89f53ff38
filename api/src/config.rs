use crate::errors::ApiError;
use std::{env, path::PathBuf};

/// Server settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` keeps everything in memory (`DB_PATH=""`).
    pub db_path: Option<PathBuf>,
    pub jwt_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            db_path: Some(PathBuf::from("db.json")),
            jwt_secret: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ApiError::ValidationError(format!("Invalid PORT: {}", raw)))?,
            Err(_) => defaults.port,
        };

        let db_path = match env::var("DB_PATH") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(PathBuf::from(raw)),
            Err(_) => defaults.db_path,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            db_path,
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub uploads_dir: String,
    pub public_base_url: String,
    pub hireflix_api_key: Option<String>,
    pub hireflix_api_url: String,
    pub hireflix_webhook_secret: Option<String>,
    pub http_timeout_secs: u64,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

pub const DEFAULT_HIREFLIX_API_URL: &str = "https://api.hireflix.com/me";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = match get_env_opt("STORE_BACKEND") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for STORE_BACKEND: {}", e)))?,
            None => StoreBackend::Postgres,
        };

        let database_url = get_env_opt("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        let log_format = match get_env_opt("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            store_backend,
            database_url,
            uploads_dir: get_env_opt("UPLOADS_DIR").unwrap_or_else(|| "./uploads".to_string()),
            public_base_url: get_env_opt("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            hireflix_api_key: get_env_opt("HIREFLIX_API_KEY"),
            hireflix_api_url: get_env_opt("HIREFLIX_API_URL")
                .unwrap_or_else(|| DEFAULT_HIREFLIX_API_URL.to_string()),
            hireflix_webhook_secret: get_env_opt("HIREFLIX_WEBHOOK_SECRET"),
            http_timeout_secs: match get_env_opt("HTTP_TIMEOUT_SECS") {
                Some(_) => get_env_parse("HTTP_TIMEOUT_SECS")?,
                None => 30,
            },
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

/// Unset and blank values are both treated as absent.
fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct GradingConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub mongodb: MongoConfig,
    pub cors: CorsConfig,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl GradingConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let mut common = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        if let Ok(port) = env::var("PORT") {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }

        Ok(GradingConfig {
            common,
            store: StoreConfig {
                backend: get_env("STORE_BACKEND", Some("mongodb"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://127.0.0.1:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("student_grading"), is_prod)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    false,
                )?),
            },
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

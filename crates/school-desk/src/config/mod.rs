use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::scoring::SchemePolicy;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub api: ApiConfig,
    pub scoring: ScoringConfig,
    pub ingest: IngestConfig,
}

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let base_url =
            env::var("APP_API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBaseUrl(base_url));
        }
        let session_path = env::var("APP_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".school-desk").join("session.json"));

        let marking_policy = match env::var("APP_MARKING_POLICY") {
            Ok(value) => SchemePolicy::parse(&value)
                .ok_or(ConfigError::InvalidMarkingPolicy(value))?,
            Err(_) => SchemePolicy::default(),
        };

        let max_upload_bytes = match env::var("APP_MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            api: ApiConfig {
                base_url,
                session_path,
            },
            scoring: ScoringConfig { marking_policy },
            ingest: IngestConfig { max_upload_bytes },
        })
    }
}

/// Settings controlling the local HTTP service binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Remote dashboard API and where the signed-in session is kept.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub session_path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub marking_policy: SchemePolicy,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    pub max_upload_bytes: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApiBaseUrl(String),
    InvalidMarkingPolicy(String),
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApiBaseUrl(value) => {
                write!(f, "APP_API_BASE_URL must be an http(s) URL, got '{}'", value)
            }
            ConfigError::InvalidMarkingPolicy(value) => write!(
                f,
                "APP_MARKING_POLICY must be 'lenient' or 'strict', got '{}'",
                value
            ),
            ConfigError::InvalidUploadLimit => {
                write!(f, "APP_MAX_UPLOAD_BYTES must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

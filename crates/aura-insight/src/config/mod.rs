use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::assessment::ScoreProfileKind;

const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_RECOMMENDATION_COUNT: usize = 3;
const DEFAULT_LEAD_STORE_PATH: &str = "data/leads.csv";

/// Distinguishes runtime behavior for different stages of the service.
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
    pub partners: PartnerConfig,
    pub leads: LeadStoreConfig,
    pub scoring: ScoringConfig,
    pub admin: AdminConfig,
}

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

        let directory_url = env::var("PARTNER_DIRECTORY_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let cache_ttl = match env::var("PARTNER_CACHE_TTL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidCacheTtl { value: raw })?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        let recommendation_count = match env::var("PARTNER_RECOMMENDATION_COUNT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidRecommendationCount { value: raw })?,
            Err(_) => DEFAULT_RECOMMENDATION_COUNT,
        };

        let lead_store_path = env::var("LEAD_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEAD_STORE_PATH));

        let profile = match env::var("SCORE_PROFILE") {
            Ok(raw) => ScoreProfileKind::parse(&raw)
                .ok_or(ConfigError::UnknownScoreProfile { value: raw })?,
            Err(_) => ScoreProfileKind::Standard,
        };

        let admin_token = env::var("ADMIN_TOKEN")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            partners: PartnerConfig {
                directory_url,
                cache_ttl: Duration::from_secs(cache_ttl),
                recommendation_count,
            },
            leads: LeadStoreConfig {
                path: lead_store_path,
            },
            scoring: ScoringConfig { profile },
            admin: AdminConfig { token: admin_token },
        })
    }
}

/// Settings controlling the HTTP server binding.
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

/// Partner directory source and recommendation sizing.
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    /// When unset the service runs with an empty directory.
    pub directory_url: Option<String>,
    pub cache_ttl: Duration,
    pub recommendation_count: usize,
}

#[derive(Debug, Clone)]
pub struct LeadStoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub profile: ScoreProfileKind,
}

/// Lead listing access. The admin routes stay disabled while `token` is unset.
#[derive(Clone)]
pub struct AdminConfig {
    pub token: Option<String>,
}

impl AdminConfig {
    pub fn enabled(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCacheTtl { value: String },
    InvalidRecommendationCount { value: String },
    UnknownScoreProfile { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCacheTtl { value } => write!(
                f,
                "PARTNER_CACHE_TTL_SECS must be a whole number of seconds (found '{value}')"
            ),
            ConfigError::InvalidRecommendationCount { value } => write!(
                f,
                "PARTNER_RECOMMENDATION_COUNT must be a non-negative integer (found '{value}')"
            ),
            ConfigError::UnknownScoreProfile { value } => write!(
                f,
                "SCORE_PROFILE must be 'standard' or 'conservative' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCacheTtl { .. }
            | ConfigError::InvalidRecommendationCount { .. }
            | ConfigError::UnknownScoreProfile { .. } => None,
        }
    }
}

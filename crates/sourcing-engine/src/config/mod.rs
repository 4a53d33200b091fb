use crate::workflows::sourcing::scenarios::{self, WeightPolicy};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub scoring: ScoringConfig,
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

        let scoring = ScoringConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
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

/// Scoring defaults applied when a request does not carry its own profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub default_profile: String,
    pub weight_policy: WeightPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_profile: scenarios::MELHOR_SCORE.to_string(),
            weight_policy: WeightPolicy::Normalize,
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_profile = env::var("SOURCING_DEFAULT_PROFILE")
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| scenarios::MELHOR_SCORE.to_string());
        if scenarios::preset(&default_profile).is_err() {
            return Err(ConfigError::UnknownDefaultProfile(default_profile));
        }

        let weight_policy = match env::var("SOURCING_WEIGHT_POLICY") {
            Ok(raw) => WeightPolicy::parse(&raw).ok_or(ConfigError::InvalidWeightPolicy(raw))?,
            Err(_) => WeightPolicy::Normalize,
        };

        Ok(Self {
            default_profile,
            weight_policy,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownDefaultProfile(String),
    InvalidWeightPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownDefaultProfile(value) => write!(
                f,
                "SOURCING_DEFAULT_PROFILE '{}' does not name a scenario preset",
                value
            ),
            ConfigError::InvalidWeightPolicy(value) => write!(
                f,
                "SOURCING_WEIGHT_POLICY '{}' must be 'normalize' or 'strict'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownDefaultProfile(_)
            | ConfigError::InvalidWeightPolicy(_) => None,
        }
    }
}

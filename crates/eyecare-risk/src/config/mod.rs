use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("EYECARE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("EYECARE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("EYECARE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("EYECARE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let artifact_path = env::var("RISK_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(ModelConfig::DEFAULT_ARTIFACT_PATH));

        let high_risk_threshold = match env::var("RISK_HIGH_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => ModelConfig::DEFAULT_HIGH_RISK_THRESHOLD,
        };

        let preload = match env::var("RISK_MODEL_PRELOAD") {
            Ok(raw) => parse_flag("RISK_MODEL_PRELOAD", &raw)?,
            Err(_) => true,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            model: ModelConfig {
                artifact_path,
                high_risk_threshold,
                preload,
            },
        })
    }
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidThreshold)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold);
    }
    Ok(value)
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name }),
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

/// Where the risk classifier artifact lives and how its output is labelled.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
    pub high_risk_threshold: f64,
    pub preload: bool,
}

impl ModelConfig {
    pub const DEFAULT_ARTIFACT_PATH: &'static str = "models/risk_model.json";
    pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = crate::risk::DEFAULT_HIGH_RISK_THRESHOLD;
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(Self::DEFAULT_ARTIFACT_PATH),
            high_risk_threshold: Self::DEFAULT_HIGH_RISK_THRESHOLD,
            preload: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold,
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "EYECARE_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "EYECARE_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold => {
                write!(f, "RISK_HIGH_THRESHOLD must be a number between 0 and 1")
            }
            ConfigError::InvalidFlag { name } => {
                write!(f, "{name} must be one of true/false/1/0/yes/no")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

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
    pub storage: StorageConfig,
    pub draw: DrawConfig,
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

        let data_file = env::var("APP_DATA_FILE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let seed_mock_data = parse_flag("APP_SEED_MOCK_DATA", true)?;

        let preview_duration_ms = parse_millis("APP_DRAW_PREVIEW_MS", 3000)?;
        let preview_interval_ms = parse_millis("APP_DRAW_PREVIEW_INTERVAL_MS", 100)?;
        if preview_interval_ms == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "APP_DRAW_PREVIEW_INTERVAL_MS",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                data_file,
                seed_mock_data,
            },
            draw: DrawConfig {
                preview_duration_ms,
                preview_interval_ms,
            },
        })
    }
}

fn parse_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key }),
        },
    }
}

fn parse_millis(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
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

/// Where the event snapshot lives and whether an empty event gets mock data.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// JSON snapshot file; `None` keeps the event in memory only.
    pub data_file: Option<PathBuf>,
    pub seed_mock_data: bool,
}

/// Timing of the cosmetic spin shown before a draw is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawConfig {
    pub preview_duration_ms: u64,
    pub preview_interval_ms: u64,
}

impl DrawConfig {
    /// Number of names cycled through during the preview, at least one.
    pub fn preview_frames(&self) -> usize {
        let frames = self.preview_duration_ms / self.preview_interval_ms.max(1);
        usize::try_from(frames).unwrap_or(usize::MAX).max(1)
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            preview_duration_ms: 3000,
            preview_interval_ms: 100,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { key: &'static str },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { key } => {
                write!(f, "{key} must be one of true/false/1/0/yes/no/on/off")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a positive whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidNumber { .. } => None,
        }
    }
}

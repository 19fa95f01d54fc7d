use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::loan::progress::{ProgressError, StageProgressTable};
use crate::workflows::loan::stage::LoanStage;
use crate::workflows::loan::tasks::DEFAULT_UPLOAD_THRESHOLD;

const DEFAULT_REQUIRED_DOCUMENTS: [&str; 3] = [
    "Income Verification",
    "Identification",
    "Additional Documentation",
];
const DEFAULT_NOTICE_DELAY_MS: u64 = 1000;

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
    pub dashboard: DashboardConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dashboard: DashboardConfig::from_env()?,
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

/// Inputs the dashboard engine consumes from its host: the stage percentage
/// table, the checklist names and the upload task threshold.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub stage_progress: StageProgressTable,
    pub required_documents: Vec<String>,
    pub upload_threshold: usize,
    pub completion_notice_delay: Duration,
}

impl DashboardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let stage_progress = match env::var("APP_STAGE_PROGRESS") {
            Ok(raw) => parse_stage_progress(&raw)?,
            Err(_) => StageProgressTable::default(),
        };

        let required_documents = match env::var("APP_REQUIRED_DOCUMENTS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_REQUIRED_DOCUMENTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        };

        let upload_threshold = match env::var("APP_UPLOAD_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidUploadThreshold)?,
            Err(_) => DEFAULT_UPLOAD_THRESHOLD,
        };

        let delay_ms = match env::var("APP_COMPLETION_NOTICE_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNoticeDelay)?,
            Err(_) => DEFAULT_NOTICE_DELAY_MS,
        };

        Ok(Self {
            stage_progress,
            required_documents,
            upload_threshold,
            completion_notice_delay: Duration::from_millis(delay_ms),
        })
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stage_progress: StageProgressTable::default(),
            required_documents: DEFAULT_REQUIRED_DOCUMENTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            upload_threshold: DEFAULT_UPLOAD_THRESHOLD,
            completion_notice_delay: Duration::from_millis(DEFAULT_NOTICE_DELAY_MS),
        }
    }
}

/// Parses `stage=percent` pairs such as `application=25,pre-flight=45`.
pub fn parse_stage_progress(raw: &str) -> Result<StageProgressTable, ConfigError> {
    let mut entries = Vec::new();
    for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (stage, percent) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidStageProgress(pair.to_string()))?;
        let stage = stage
            .parse::<LoanStage>()
            .map_err(|_| ConfigError::InvalidStage(stage.trim().to_string()))?;
        let percent = percent
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidStageProgress(pair.to_string()))?;
        if entries.iter().any(|(seen, _)| *seen == stage) {
            return Err(ConfigError::InvalidStageProgress(pair.to_string()));
        }
        entries.push((stage, percent));
    }

    StageProgressTable::from_entries(entries).map_err(|err| match err {
        ProgressError::PercentOutOfRange { stage, percent } => {
            ConfigError::InvalidStageProgress(format!("{stage}={percent}"))
        }
        other => ConfigError::InvalidStageProgress(other.to_string()),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStage(String),
    InvalidStageProgress(String),
    InvalidUploadThreshold,
    InvalidNoticeDelay,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStage(stage) => {
                write!(f, "APP_STAGE_PROGRESS names unknown stage '{}'", stage)
            }
            ConfigError::InvalidStageProgress(entry) => write!(
                f,
                "APP_STAGE_PROGRESS entry '{}' must be stage=percent with percent in 0..=100, one entry per stage",
                entry
            ),
            ConfigError::InvalidUploadThreshold => {
                write!(f, "APP_UPLOAD_THRESHOLD must be a positive integer")
            }
            ConfigError::InvalidNoticeDelay => {
                write!(f, "APP_COMPLETION_NOTICE_DELAY_MS must be a whole number of milliseconds")
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

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}

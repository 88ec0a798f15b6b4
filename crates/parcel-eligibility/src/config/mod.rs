use std::env;
use std::fmt;
use std::path::PathBuf;

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
    pub store: StoreConfig,
    pub evaluation: EvaluationSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("PARCEL_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let program_store = env::var("PARCEL_PROGRAM_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROGRAM_STORE));
        let default_program = env::var("PARCEL_DEFAULT_PROGRAM")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let parallel = match env::var("PARCEL_PARALLEL") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidParallelFlag(raw))?,
            Err(_) => true,
        };

        let log_level = env::var("PARCEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            store: StoreConfig {
                path: program_store,
                default_program,
            },
            evaluation: EvaluationSettings { parallel },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

const DEFAULT_PROGRAM_STORE: &str = "sep_config.json";

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Location of the program configuration document.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub default_program: Option<String>,
}

/// Knobs for batch evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationSettings {
    pub parallel: bool,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidParallelFlag(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParallelFlag(raw) => {
                write!(f, "PARCEL_PARALLEL must be a boolean flag (found '{raw}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

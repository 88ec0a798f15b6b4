use crate::config::ConfigError;
use crate::eligibility::{ConfigurationError, IntakeError, OverrideTableError, ProgramStoreError};
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(ProgramStoreError),
    Overrides(OverrideTableError),
    Intake(IntakeError),
    Program(ConfigurationError),
    Output(csv::Error),
    Render(serde_json::Error),
    Usage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "program store error: {}", err),
            AppError::Overrides(err) => write!(f, "override table error: {}", err),
            AppError::Intake(err) => write!(f, "parcel intake error: {}", err),
            AppError::Program(err) => write!(f, "{}", err),
            AppError::Output(err) => write!(f, "failed to write report: {}", err),
            AppError::Render(err) => write!(f, "failed to render report: {}", err),
            AppError::Usage(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Overrides(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Program(err) => Some(err),
            AppError::Output(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ProgramStoreError> for AppError {
    fn from(value: ProgramStoreError) -> Self {
        Self::Store(value)
    }
}

impl From<OverrideTableError> for AppError {
    fn from(value: OverrideTableError) -> Self {
        Self::Overrides(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Intake(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Program(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Output(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}

//! Custom error types for the application

use thiserror::Error;

/// Construction-time errors of the metering core. Nothing on the sample path
/// can fail, so every misconfiguration has to surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("scaling range must satisfy 0 <= floor < ceiling <= 1, got {floor}..{ceiling}")]
    InvalidRange { floor: f32, ceiling: f32 },
    #[error("step count must be at least 1")]
    ZeroSteps,
    #[error("RMS window must hold at least one sample")]
    ZeroWindow,
    #[error("clip threshold must be within (0, 1], got {0}")]
    InvalidClipThreshold(f32),
    #[error("{channel} meter has no display columns")]
    EmptyMatrix { channel: &'static str },
    #[error("{channel} column {column} has {found} positions but the meter has {expected} steps")]
    MatrixSize {
        channel: &'static str,
        column: usize,
        found: usize,
        expected: usize,
    },
}

/// Errors from validating command line arguments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid column {0} is outside the {1}-column clip grid")]
    ColumnOutOfRange(u8, u8),
    #[error("{0} needs at least one grid column")]
    NoColumns(&'static str),
    #[error("left and right meters both use grid column {0}")]
    SharedColumn(u8),
    #[error("left and right inputs must differ")]
    SameInput,
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Application-specific error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Audio device related errors
    #[error("Audio device error: {0}")]
    AudioDevice(String),
    /// Audio stream related errors
    #[error("Audio stream error: {0}")]
    AudioStream(String),
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Meter bank could not be built
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),
    /// General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<cpal::DevicesError> for AppError {
    fn from(err: cpal::DevicesError) -> Self {
        AppError::AudioDevice(format!("Failed to enumerate devices: {}", err))
    }
}

impl From<cpal::DeviceNameError> for AppError {
    fn from(err: cpal::DeviceNameError) -> Self {
        AppError::AudioDevice(format!("Failed to get device name: {}", err))
    }
}

impl From<cpal::SupportedStreamConfigsError> for AppError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        AppError::AudioDevice(format!("Failed to get supported stream configs: {}", err))
    }
}

impl From<cpal::BuildStreamError> for AppError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AppError::AudioStream(format!("Failed to build audio stream: {}", err))
    }
}

impl From<cpal::PlayStreamError> for AppError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AppError::AudioStream(format!("Failed to play audio stream: {}", err))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_lifts_into_config_and_app_errors() {
        let setup = SetupError::MatrixSize {
            channel: "left",
            column: 1,
            found: 9,
            expected: 10,
        };
        let config: ConfigError = setup.clone().into();
        assert_eq!(config.to_string(), setup.to_string());

        let app: AppError = setup.into();
        assert!(app.to_string().starts_with("Setup error: left column 1 has 9 positions"));
    }
}

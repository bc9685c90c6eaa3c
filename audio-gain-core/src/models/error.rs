use thiserror::Error;

/// Errors surfaced at stream setup and configuration time.
///
/// The per-buffer path (resolve + transform) never returns one of these;
/// anomalies there are clamped and logged instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GainError {
    #[error("invalid wave format: {0}")]
    InvalidFormat(String),

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

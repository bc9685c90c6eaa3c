use std::fs;
use std::path::Path;

use crate::models::config::CaptureConfiguration;
use crate::models::error::GainError;

/// Load a capture configuration from a JSON file.
///
/// Missing fields take their defaults; the result is validated.
pub fn read_settings(path: &Path) -> Result<CaptureConfiguration, GainError> {
    let json = fs::read_to_string(path)
        .map_err(|e| GainError::StorageError(format!("failed to read settings: {}", e)))?;
    parse_settings(&json)
}

/// Parse and validate a JSON capture configuration.
pub fn parse_settings(json: &str) -> Result<CaptureConfiguration, GainError> {
    let config: CaptureConfiguration = serde_json::from_str(json)
        .map_err(|e| GainError::StorageError(format!("failed to parse settings: {}", e)))?;
    config.validate().map_err(GainError::ConfigurationFailed)?;
    Ok(config)
}

/// Write a capture configuration as pretty-printed JSON.
pub fn write_settings(config: &CaptureConfiguration, path: &Path) -> Result<(), GainError> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| GainError::StorageError(format!("failed to serialize settings: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| GainError::StorageError(format!("failed to write settings: {}", e)))?;
    Ok(())
}

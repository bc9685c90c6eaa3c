//! `audio-gain [settings.json]`
//!
//! Captures the default communications microphone, rewriting each buffer with
//! the configured gains, until Enter is pressed. Prints the processing
//! counters as JSON on exit.

#[cfg(target_os = "windows")]
fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "windows")]
fn run() -> Result<(), audio_gain_core::GainError> {
    use std::path::Path;
    use std::sync::Arc;

    use audio_gain_core::storage::settings;
    use audio_gain_core::{CaptureConfiguration, CaptureProvider, GainError, LogDiagnostics};
    use audio_gain_windows::WasapiGainCapture;

    let config = match std::env::args_os().nth(1) {
        Some(path) => settings::read_settings(Path::new(&path))?,
        None => CaptureConfiguration::default(),
    };
    log::info!(
        "Gains: int16 {}, float32 {}, fallback {}",
        config.gain.int16_gain,
        config.gain.float32_gain,
        config.gain.fallback_gain
    );

    let mut capture = WasapiGainCapture::default_device();
    if !capture.is_available() {
        return Err(GainError::DeviceNotAvailable);
    }

    capture.start(config, Arc::new(LogDiagnostics))?;
    println!("Capturing from {}. Press Enter to stop.", capture.device_info().name);

    let mut line = String::new();
    if let Err(e) = std::io::stdin().read_line(&mut line) {
        log::warn!("Failed to read stdin: {}", e);
    }

    let stats = capture.stop()?;
    let json = serde_json::to_string_pretty(&stats)
        .map_err(|e| GainError::Unknown(format!("failed to serialize stats: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn main() {
    env_logger::init();
    log::error!("audio-gain captures through WASAPI and only runs on Windows");
    std::process::exit(1);
}

//! WASAPI capture provider that rewrites buffers in place.
//!
//! Opens the default communications capture endpoint in shared mode with
//! event-driven buffering. Each packet is run through a `BufferProcessor`
//! built from the endpoint's mix format, then released back to the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::System::Threading::*;

use audio_gain_core::models::audio_models::AudioSource;
use audio_gain_core::models::config::CaptureConfiguration;
use audio_gain_core::models::error::GainError;
use audio_gain_core::models::stats::ProcessingStats;
use audio_gain_core::processing::wave_format::{self, WAVEFORMATEX_SIZE};
use audio_gain_core::session::processor::BufferProcessor;
use audio_gain_core::traits::capture_provider::CaptureProvider;
use audio_gain_core::traits::diagnostics::DiagnosticSink;

const DEFAULT_DEVICE_ID: &str = "default-communications-capture";

/// WASAPI capture on the default communications microphone.
///
/// The capture thread owns every COM object and the `BufferProcessor`;
/// only the running flag and the join handle are shared.
pub struct WasapiGainCapture {
    device_name: String,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<Option<ProcessingStats>>>>,
}

impl WasapiGainCapture {
    /// Create a capture for the default communications capture endpoint.
    pub fn default_device() -> Self {
        Self {
            device_name: "Default Communications Microphone".into(),
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl CaptureProvider for WasapiGainCapture {
    fn is_available(&self) -> bool {
        unsafe {
            // S_FALSE (already initialized) still needs a matching CoUninitialize.
            let initialized = CoInitializeEx(None, COINIT_MULTITHREADED).is_ok();
            let available = default_capture_device().is_ok();
            if initialized {
                CoUninitialize();
            }
            available
        }
    }

    fn start(
        &mut self,
        config: CaptureConfiguration,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<(), GainError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(GainError::ConfigurationFailed("capture already running".into()));
        }
        config.validate().map_err(GainError::ConfigurationFailed)?;

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = thread::Builder::new()
            .name("wasapi-gain-capture".into())
            .spawn(move || {
                let result = capture_loop(&running, config, diagnostics);
                running.store(false, Ordering::SeqCst);
                match result {
                    Ok(stats) => Some(stats),
                    Err(e) => {
                        log::error!("Capture error: {}", e);
                        None
                    }
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                GainError::Unknown(format!("failed to spawn capture thread: {}", e))
            })?;

        *self.capture_handle.lock() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<ProcessingStats, GainError> {
        self.running.store(false, Ordering::SeqCst);
        let handle = self
            .capture_handle
            .lock()
            .take()
            .ok_or_else(|| GainError::ConfigurationFailed("capture not started".into()))?;

        match handle.join() {
            Ok(Some(stats)) => Ok(stats),
            Ok(None) => Err(GainError::Unknown("capture thread failed, see log".into())),
            Err(_) => Err(GainError::Unknown("capture thread panicked".into())),
        }
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: DEFAULT_DEVICE_ID.into(),
            name: self.device_name.clone(),
            is_default: true,
        }
    }
}

impl Drop for WasapiGainCapture {
    fn drop(&mut self) {
        if self.capture_handle.lock().is_some() {
            let _ = self.stop();
        }
    }
}

unsafe fn default_capture_device() -> Result<IMMDevice, GainError> {
    let enumerator: IMMDeviceEnumerator =
        CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|_| GainError::DeviceNotAvailable)?;
    enumerator
        .GetDefaultAudioEndpoint(eCapture, eCommunications)
        .map_err(|_| GainError::DeviceNotAvailable)
}

/// Capture loop running on the dedicated thread.
///
/// Sequence:
/// 1. CoInitializeEx (MTA)
/// 2. Default communications capture endpoint
/// 3. Activate IAudioClient, read and parse the mix format
/// 4. Initialize in shared mode with EVENTCALLBACK, attach the event
/// 5. Get IAudioCaptureClient, register with MMCSS
/// 6. Start; on every event drain all pending packets through the processor
fn capture_loop(
    running: &AtomicBool,
    config: CaptureConfiguration,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> Result<ProcessingStats, GainError> {
    unsafe {
        CoInitializeEx(None, COINIT_MULTITHREADED)
            .ok()
            .map_err(|e| GainError::Unknown(format!("CoInitializeEx failed: {}", e)))?;

        let _com_guard = CoUninitializeGuard;

        let device = default_capture_device()?;
        if let Ok(id) = device.GetId() {
            log::info!("Capture endpoint: {}", id.to_string().unwrap_or_default());
        }

        let audio_client: IAudioClient = device
            .Activate(CLSCTX_ALL, None)
            .map_err(|e| GainError::ConfigurationFailed(format!("Activate failed: {}", e)))?;

        let mix_format = MixFormat(
            audio_client
                .GetMixFormat()
                .map_err(|e| GainError::ConfigurationFailed(format!("GetMixFormat failed: {}", e)))?,
        );
        let descriptor = wave_format::parse_wave_format(mix_format.as_bytes())?;
        if let Err(e) = descriptor.validate() {
            log::warn!("Mix format looks malformed ({}); continuing with clamped handling", e);
        }

        audio_client
            .Initialize(
                AUDCLNT_SHAREMODE_SHARED,
                AUDCLNT_STREAMFLAGS_EVENTCALLBACK | AUDCLNT_STREAMFLAGS_NOPERSIST,
                config.buffer_duration_hns(),
                0,
                mix_format.0,
                None,
            )
            .map_err(|e| {
                GainError::ConfigurationFailed(format!("IAudioClient::Initialize failed: {}", e))
            })?;

        let event = EventHandle(
            CreateEventW(None, false, false, PCWSTR::null())
                .map_err(|e| GainError::Unknown(format!("CreateEventW failed: {}", e)))?,
        );
        audio_client
            .SetEventHandle(event.0)
            .map_err(|e| GainError::ConfigurationFailed(format!("SetEventHandle failed: {}", e)))?;

        let capture_client: IAudioCaptureClient = audio_client
            .GetService()
            .map_err(|e| GainError::ConfigurationFailed(format!("GetService failed: {}", e)))?;

        // Register with MMCSS for real-time priority
        let mut task_index: u32 = 0;
        let task_name: Vec<u16> = "Pro Audio\0".encode_utf16().collect();
        let _mmcss_handle = AvSetMmThreadCharacteristicsW(PCWSTR(task_name.as_ptr()), &mut task_index);

        let mut processor = BufferProcessor::with_diagnostics(descriptor, config.gain, diagnostics);
        let block_align = descriptor.block_align as usize;

        audio_client
            .Start()
            .map_err(|e| GainError::Unknown(format!("IAudioClient::Start failed: {}", e)))?;

        let result = drain_until_stopped(
            running,
            &capture_client,
            event.0,
            config.event_timeout_ms,
            block_align,
            &mut processor,
        );

        let _ = audio_client.Stop();
        result?;

        let stats = processor.into_stats();
        log::info!(
            "Capture stopped: {} packets ({} silent), {} samples rewritten",
            stats.packets,
            stats.silent_packets,
            stats.samples_rewritten
        );
        Ok(stats)
    }
}

unsafe fn drain_until_stopped(
    running: &AtomicBool,
    capture_client: &IAudioCaptureClient,
    event: HANDLE,
    timeout_ms: u32,
    block_align: usize,
    processor: &mut BufferProcessor,
) -> Result<(), GainError> {
    while running.load(Ordering::SeqCst) {
        if WaitForSingleObject(event, timeout_ms) != WAIT_OBJECT_0 {
            log::debug!("No buffer-ready event within {} ms", timeout_ms);
            continue;
        }

        let mut packet_length = capture_client
            .GetNextPacketSize()
            .map_err(|e| GainError::Unknown(format!("GetNextPacketSize failed: {}", e)))?;

        while packet_length > 0 {
            let mut buffer_ptr: *mut u8 = std::ptr::null_mut();
            let mut num_frames: u32 = 0;
            let mut flags: u32 = 0;

            capture_client
                .GetBuffer(&mut buffer_ptr, &mut num_frames, &mut flags, None, None)
                .map_err(|e| GainError::Unknown(format!("GetBuffer failed: {}", e)))?;

            let silent = flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0;
            if num_frames > 0 && !buffer_ptr.is_null() {
                // SAFETY: the engine guarantees num_frames * nBlockAlign bytes at
                // buffer_ptr until ReleaseBuffer; the slice does not outlive this block.
                let buffer = std::slice::from_raw_parts_mut(buffer_ptr, num_frames as usize * block_align);
                processor.process(buffer, num_frames, silent);
            }

            capture_client
                .ReleaseBuffer(num_frames)
                .map_err(|e| GainError::Unknown(format!("ReleaseBuffer failed: {}", e)))?;

            packet_length = capture_client
                .GetNextPacketSize()
                .map_err(|e| GainError::Unknown(format!("GetNextPacketSize failed: {}", e)))?;
        }
    }
    Ok(())
}

/// Mix format returned by `GetMixFormat`, freed with `CoTaskMemFree` on drop.
struct MixFormat(*mut WAVEFORMATEX);

impl MixFormat {
    /// The full format blob, `18 + cbSize` bytes.
    unsafe fn as_bytes(&self) -> &[u8] {
        let header = std::slice::from_raw_parts(self.0 as *const u8, WAVEFORMATEX_SIZE);
        let len = wave_format::declared_len(header).unwrap_or(WAVEFORMATEX_SIZE);
        std::slice::from_raw_parts(self.0 as *const u8, len)
    }
}

impl Drop for MixFormat {
    fn drop(&mut self) {
        unsafe {
            CoTaskMemFree(Some(self.0 as *const _));
        }
    }
}

struct EventHandle(HANDLE);

impl Drop for EventHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// RAII guard to call CoUninitialize when dropped.
struct CoUninitializeGuard;

impl Drop for CoUninitializeGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

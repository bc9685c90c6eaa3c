use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters kept by a `BufferProcessor` over the lifetime of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub started_at: DateTime<Utc>,
    /// Buffers handed over by the capture loop, silent ones included.
    pub packets: u64,
    pub silent_packets: u64,
    /// Frames in non-silent buffers.
    pub frames_processed: u64,
    pub samples_rewritten: u64,
    pub renegotiations: u64,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            packets: 0,
            silent_packets: 0,
            frames_processed: 0,
            samples_rewritten: 0,
            renegotiations: 0,
        }
    }

    /// Wall-clock seconds since the stats were created.
    pub fn elapsed_secs(&self) -> f64 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds().max(0) as f64 / 1000.0
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

use super::bands::Bands;

/// Snapshot of the audio analysis handed to the active visualization for one tick.
///
/// The render loop owns a single frame and refills it every tick, so the
/// buffers keep their allocation across frames.
#[derive(Debug, Clone, Default)]
pub struct AudioFrame {
    /// Byte magnitudes, `fft_size / 2` bins. Empty when `has_audio` is false.
    pub frequency: Vec<u8>,
    /// Raw waveform centered at 128, `fft_size` samples. Empty when `has_audio` is false.
    pub time_domain: Vec<u8>,
    pub elapsed_seconds: f64,
    pub bands: Bands,
    pub has_audio: bool,
    /// Rate the buffers were analysed at, 0 for idle frames.
    pub sample_rate: f32,
}

impl AudioFrame {
    /// A frame for when no capture session is running.
    pub fn idle(elapsed_seconds: f64) -> Self {
        let mut frame = Self::default();
        frame.make_idle(elapsed_seconds);
        frame
    }

    pub(crate) fn make_idle(&mut self, elapsed_seconds: f64) {
        self.frequency.clear();
        self.time_domain.clear();
        self.elapsed_seconds = elapsed_seconds;
        self.bands = Bands::default();
        self.has_audio = false;
        self.sample_rate = 0.0;
    }

    /// Hz at the lower edge of `bin`.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        if self.frequency.is_empty() {
            return 0.0;
        }
        bin as f32 * (self.sample_rate / 2.0) / self.frequency.len() as f32
    }
}

/// Turns host frame timestamps (milliseconds) into session-relative seconds.
///
/// The first timestamp after a reset becomes time zero. Readings never go
/// backwards, even if the host hands out an older timestamp.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    origin_ms: Option<f64>,
    last_seconds: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session timeline.
    pub fn reset(&mut self) {
        self.origin_ms = None;
        self.last_seconds = 0.0;
    }

    pub fn elapsed(&mut self, now_ms: f64) -> f64 {
        let origin = *self.origin_ms.get_or_insert(now_ms);
        let seconds = ((now_ms - origin) / 1000.0).max(self.last_seconds);
        self.last_seconds = seconds;
        seconds
    }
}

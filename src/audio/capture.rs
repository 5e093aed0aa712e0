//! Capture session: one live analyser, read on demand.

use log::{debug, warn};

use super::bands::compute_bands;
use super::frame::AudioFrame;
use crate::error::CaptureError;

/// Source of analyser data, e.g. a WebAudio `AnalyserNode` fed by the microphone.
///
/// Reads are synchronous and always return the most recent analysis; there is
/// no queue behind them.
pub trait AudioAnalyser {
    fn sample_rate(&self) -> f32;

    fn fft_size(&self) -> usize;

    fn frequency_bin_count(&self) -> usize {
        self.fft_size() / 2
    }

    /// Fills `out` (length `frequency_bin_count`) with byte magnitudes.
    fn read_frequency(&mut self, out: &mut [u8]);

    /// Fills `out` (length `fft_size`) with the byte waveform.
    fn read_time_domain(&mut self, out: &mut [u8]);

    /// Disconnects the input and tears down the audio graph.
    fn release(&mut self) -> Result<(), CaptureError>;
}

/// The microphone-to-analyser connection for one start/stop cycle.
pub struct CaptureSession {
    analyser: Box<dyn AudioAnalyser>,
    released: bool,
}

impl CaptureSession {
    pub fn new(analyser: Box<dyn AudioAnalyser>) -> Self {
        debug!(
            "capture session opened: {} Hz, fft size {}",
            analyser.sample_rate(),
            analyser.fft_size()
        );
        Self {
            analyser,
            released: false,
        }
    }

    /// Refills `frame` from the analyser's current buffers.
    pub fn pull_into(&mut self, frame: &mut AudioFrame, elapsed_seconds: f64) {
        let fft_size = self.analyser.fft_size();
        frame.frequency.resize(self.analyser.frequency_bin_count(), 0);
        frame.time_domain.resize(fft_size, 128);
        self.analyser.read_frequency(&mut frame.frequency);
        self.analyser.read_time_domain(&mut frame.time_domain);

        frame.sample_rate = self.analyser.sample_rate();
        frame.bands = compute_bands(&frame.frequency, fft_size, frame.sample_rate);
        frame.elapsed_seconds = elapsed_seconds;
        frame.has_audio = true;
    }

    pub fn pull_frame(&mut self, elapsed_seconds: f64) -> AudioFrame {
        let mut frame = AudioFrame::default();
        self.pull_into(&mut frame, elapsed_seconds);
        frame
    }

    /// Releases the microphone and the analysis graph.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.analyser.release() {
            Ok(()) => debug!("capture session closed"),
            Err(e) => warn!("capture session closed with errors: {e}"),
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

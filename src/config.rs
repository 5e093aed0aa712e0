//! Runtime configuration handed over by the hosting page.
//!
//! Every field has a default so `new Visualizer()` and
//! `new Visualizer({ fftSize: 4096 })` are both valid.

use serde::Deserialize;

use crate::error::ConfigError;

const MIN_FFT_SIZE: u32 = 32;
const MAX_FFT_SIZE: u32 = 32768;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizerConfig {
    /// Analyser window in samples; the spectrum has `fft_size / 2` bins.
    pub fft_size: u32,
    /// Analyser smoothing between successive spectra, applied upstream of band extraction.
    pub smoothing_time_constant: f64,
    /// Mode activated by the first `start()`.
    pub initial_mode: String,
    /// Upper bound for either side of the drawing buffer, in device pixels.
    pub max_canvas_dimension: u32,
    /// Directory that holds `basic.vert.glsl` and the `*.frag.glsl` files.
    pub shader_base: String,
    /// Element the active visualization mounts its canvas into.
    pub stage_element_id: String,
    /// Element that receives status text, if the page has one.
    pub status_element_id: Option<String>,
    pub microphone: MicrophoneConfig,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            initial_mode: "frequency".to_string(),
            max_canvas_dimension: 4096,
            shader_base: "./shaders".to_string(),
            stage_element_id: "stage".to_string(),
            status_element_id: Some("status".to_string()),
            microphone: MicrophoneConfig::default(),
        }
    }
}

impl VisualizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_time_constant));
        }
        if self.max_canvas_dimension == 0 {
            return Err(ConfigError::InvalidDimension);
        }
        if self.initial_mode.trim().is_empty() {
            return Err(ConfigError::EmptyMode);
        }
        Ok(())
    }
}

/// Processing the browser may apply to the microphone signal.
///
/// All off by default: the analyser wants the raw signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MicrophoneConfig {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

//! WebAudio analyser fed by the microphone.

use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, MediaStream, MediaStreamAudioSourceNode, MediaStreamConstraints,
    MediaStreamTrack,
};

use super::describe;
use crate::audio::AudioAnalyser;
use crate::config::MicrophoneConfig;
use crate::error::{CaptureError, ReleaseError};
use crate::viz::ResourceBin;

#[derive(Debug, Clone)]
pub struct AnalyserSettings {
    pub fft_size: u32,
    pub smoothing_time_constant: f64,
    pub microphone: MicrophoneConfig,
}

pub struct MicrophoneAnalyser {
    context: AudioContext,
    stream: MediaStream,
    source: MediaStreamAudioSourceNode,
    analyser: AnalyserNode,
    fft_size: usize,
}

impl MicrophoneAnalyser {
    /// Asks for the microphone and wires it into an analyser.
    ///
    /// Nothing stays open on failure: a granted stream whose graph cannot be
    /// built has its tracks stopped before the error is returned.
    pub async fn acquire(settings: &AnalyserSettings) -> Result<Self, CaptureError> {
        let window =
            web_sys::window().ok_or_else(|| CaptureError::Unsupported("no window".into()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| CaptureError::Unsupported(describe(&e)))?;

        let constraints = constraints(&settings.microphone)
            .map_err(|e| CaptureError::Unsupported(describe(&e)))?;
        let request = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| CaptureError::PermissionDenied(describe(&e)))?;
        let stream: MediaStream = JsFuture::from(request)
            .await
            .map_err(|e| CaptureError::PermissionDenied(describe(&e)))?
            .dyn_into()
            .map_err(|e| CaptureError::Graph(describe(&e)))?;

        Self::connect(stream.clone(), settings).map_err(|e| {
            stop_tracks(&stream);
            e
        })
    }

    fn connect(stream: MediaStream, settings: &AnalyserSettings) -> Result<Self, CaptureError> {
        let graph = |e: JsValue| CaptureError::Graph(describe(&e));
        let context = AudioContext::new().map_err(graph)?;

        let nodes = (|| {
            let source = context.create_media_stream_source(&stream)?;
            let analyser = context.create_analyser()?;
            analyser.set_fft_size(settings.fft_size);
            analyser.set_smoothing_time_constant(settings.smoothing_time_constant);
            source.connect_with_audio_node(&analyser)?;
            Ok::<_, JsValue>((source, analyser))
        })();

        let (source, analyser) = match nodes {
            Ok(nodes) => nodes,
            Err(e) => {
                let _ = context.close();
                return Err(graph(e));
            }
        };

        // Contexts created outside a user gesture start suspended.
        let _ = context.resume();

        let fft_size = analyser.fft_size() as usize;
        Ok(Self {
            context,
            stream,
            source,
            analyser,
            fft_size,
        })
    }
}

impl AudioAnalyser for MicrophoneAnalyser {
    fn sample_rate(&self) -> f32 {
        self.context.sample_rate()
    }

    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn read_frequency(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn read_time_domain(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_time_domain_data(out);
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        let mut bin = ResourceBin::new("microphone");

        let context = self.context.clone();
        bin.push("audio context", move || {
            context.close().map(|_| ()).map_err(release_error)
        });
        let stream = self.stream.clone();
        bin.push("media tracks", move || {
            stop_tracks(&stream);
            Ok(())
        });
        let analyser = self.analyser.clone();
        bin.push("analyser node", move || analyser.disconnect().map_err(release_error));
        let source = self.source.clone();
        bin.push("source node", move || source.disconnect().map_err(release_error));

        match bin.release_all() {
            0 => Ok(()),
            failed => Err(CaptureError::Graph(format!(
                "{failed} audio resources failed to release"
            ))),
        }
    }
}

fn constraints(config: &MicrophoneConfig) -> Result<MediaStreamConstraints, JsValue> {
    let audio = Object::new();
    Reflect::set(&audio, &"echoCancellation".into(), &config.echo_cancellation.into())?;
    Reflect::set(&audio, &"noiseSuppression".into(), &config.noise_suppression.into())?;
    Reflect::set(&audio, &"autoGainControl".into(), &config.auto_gain_control.into())?;

    let constraints = Object::new();
    Reflect::set(&constraints, &"audio".into(), &audio)?;
    Reflect::set(&constraints, &"video".into(), &JsValue::FALSE)?;
    Ok(constraints.unchecked_into())
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn release_error(e: JsValue) -> ReleaseError {
    ReleaseError(describe(&e))
}

//! Spectrum bars on a 2D canvas.

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::audio::AudioFrame;
use crate::error::VizError;
use crate::viz::{SurfaceLease, SurfaceSlot, Viewport, Visualization};
use crate::wasm::stage::{size_canvas, Stage};

const BAR_COUNT: usize = 96;
/// Bars cover the lower part of the spectrum, where most musical energy sits.
const SPECTRUM_FRACTION: f32 = 0.5;
const FALL_OFF: f32 = 0.92;

pub struct FrequencyBars {
    lease: Option<SurfaceLease<Stage>>,
    canvas: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    viewport: Viewport,
    levels: [f32; BAR_COUNT],
}

impl FrequencyBars {
    pub fn new(stage: &SurfaceSlot<Stage>, viewport: Viewport) -> Result<Self, VizError> {
        Ok(Self {
            lease: Some(stage.acquire()?),
            canvas: None,
            viewport,
            levels: [0.0; BAR_COUNT],
        })
    }

    fn target_level(frame: &AudioFrame, bar: usize) -> f32 {
        if !frame.has_audio || frame.frequency.is_empty() {
            let phase = frame.elapsed_seconds as f32 * 2.0 + bar as f32 * 0.25;
            return 0.2 + 0.15 * phase.sin();
        }
        let usable = ((frame.frequency.len() as f32 * SPECTRUM_FRACTION) as usize).max(BAR_COUNT);
        let per_bar = (usable / BAR_COUNT).max(1);
        let start = (bar * per_bar).min(frame.frequency.len());
        let end = (start + per_bar).min(frame.frequency.len());
        let bins = &frame.frequency[start..end];
        if bins.is_empty() {
            return 0.0;
        }
        bins.iter().map(|&v| f32::from(v)).sum::<f32>() / (bins.len() as f32 * 255.0)
    }
}

impl Visualization for FrequencyBars {
    fn initialize(&mut self) -> Result<(), VizError> {
        let lease = self
            .lease
            .as_ref()
            .ok_or_else(|| VizError::Context("stage already released".into()))?;
        self.canvas = Some(lease.mount_2d(self.viewport)?);
        Ok(())
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some((canvas, _)) = &self.canvas {
            size_canvas(canvas, viewport);
        }
    }

    fn draw(&mut self, frame: &AudioFrame) -> Result<(), VizError> {
        let Some((_, ctx)) = &self.canvas else {
            return Ok(());
        };
        let width = f64::from(self.viewport.width);
        let height = f64::from(self.viewport.height);

        ctx.set_fill_style_str("#05050a");
        ctx.fill_rect(0.0, 0.0, width, height);

        let bar_width = width / BAR_COUNT as f64;
        for bar in 0..BAR_COUNT {
            let level = Self::target_level(frame, bar).max(self.levels[bar] * FALL_OFF);
            self.levels[bar] = level;

            let bar_height = f64::from(level) * height * 0.9;
            let hue = 200.0 + 140.0 * bar as f32 / BAR_COUNT as f32 + frame.bands.bass * 60.0;
            let lightness = 40.0 + 30.0 * level;
            ctx.set_fill_style_str(&format!("hsl({hue:.0}, 85%, {lightness:.0}%)"));
            ctx.fill_rect(
                bar as f64 * bar_width,
                height - bar_height,
                (bar_width - 1.0).max(1.0),
                bar_height,
            );
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.canvas = None;
        self.lease = None;
    }
}

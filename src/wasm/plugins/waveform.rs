//! Oscilloscope trace of the time-domain signal.

use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::audio::AudioFrame;
use crate::error::VizError;
use crate::viz::{SurfaceLease, SurfaceSlot, Viewport, Visualization};
use crate::wasm::stage::{size_canvas, Stage};

const IDLE_POINTS: usize = 256;

pub struct Oscilloscope {
    lease: Option<SurfaceLease<Stage>>,
    canvas: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    viewport: Viewport,
}

impl Oscilloscope {
    pub fn new(stage: &SurfaceSlot<Stage>, viewport: Viewport) -> Result<Self, VizError> {
        Ok(Self {
            lease: Some(stage.acquire()?),
            canvas: None,
            viewport,
        })
    }
}

impl Visualization for Oscilloscope {
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
        let mid = height / 2.0;

        // Translucent fill leaves a short trail behind the trace.
        ctx.set_fill_style_str("rgba(4, 4, 12, 0.35)");
        ctx.fill_rect(0.0, 0.0, width, height);

        let hue = 160.0 + f64::from(frame.bands.treble) * 180.0;
        ctx.set_stroke_style_str(&format!("hsl({hue:.0}, 90%, 60%)"));
        ctx.set_line_width(2.0 + f64::from(frame.bands.bass) * 4.0);
        ctx.begin_path();

        if frame.has_audio && frame.time_domain.len() > 1 {
            let last = (frame.time_domain.len() - 1) as f64;
            for (i, &sample) in frame.time_domain.iter().enumerate() {
                let x = i as f64 / last * width;
                let y = mid + (f64::from(sample) - 128.0) / 128.0 * mid * 0.9;
                if i == 0 {
                    ctx.move_to(x, y);
                } else {
                    ctx.line_to(x, y);
                }
            }
        } else {
            let t = frame.elapsed_seconds;
            for i in 0..IDLE_POINTS {
                let u = i as f64 / (IDLE_POINTS - 1) as f64;
                let y = mid + (u * TAU * 3.0 + t * 2.0).sin() * mid * 0.2 * (t * 0.7).sin().abs();
                if i == 0 {
                    ctx.move_to(u * width, y);
                } else {
                    ctx.line_to(u * width, y);
                }
            }
        }
        ctx.stroke();
        Ok(())
    }

    fn dispose(&mut self) {
        self.canvas = None;
        self.lease = None;
    }
}

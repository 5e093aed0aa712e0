//! Maps host layout sizes to drawing-buffer sizes.

use log::debug;

use crate::viz::Viewport;

/// Tracks the current drawing-buffer size and bounds it.
///
/// The render loop owns one of these and forwards every fitted viewport to
/// its active visualization.
#[derive(Debug, Clone)]
pub struct ResizeCoordinator {
    max_dimension: u32,
    pixel_ratio: f64,
    current: Viewport,
}

impl ResizeCoordinator {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            pixel_ratio: 1.0,
            current: Viewport::default(),
        }
    }

    /// Device pixels per layout pixel. Non-finite or non-positive ratios fall back to 1.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Converts a layout size to a bounded device-pixel viewport.
    ///
    /// If either side exceeds the bound, both sides shrink by the same
    /// factor so the aspect ratio survives.
    pub fn fit(&self, css_width: f64, css_height: f64) -> Viewport {
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let mut width = sanitize(css_width) * self.pixel_ratio;
        let mut height = sanitize(css_height) * self.pixel_ratio;

        let largest = width.max(height);
        let bound = f64::from(self.max_dimension);
        if largest > bound {
            let scale = bound / largest;
            width *= scale;
            height *= scale;
        }

        Viewport::new(
            (width.round() as u32).clamp(1, self.max_dimension),
            (height.round() as u32).clamp(1, self.max_dimension),
        )
    }

    /// Fits and records a new size.
    pub fn apply(&mut self, css_width: f64, css_height: f64) -> Viewport {
        let viewport = self.fit(css_width, css_height);
        if viewport != self.current {
            debug!(
                "viewport {}x{} -> {}x{}",
                self.current.width, self.current.height, viewport.width, viewport.height
            );
            self.current = viewport;
        }
        viewport
    }
}

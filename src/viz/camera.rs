use glam::{Mat4, Vec3};

use super::Viewport;

/// Perspective projection plus a look-at view for 3D visualizations.
///
/// Keep it in sync with the drawing buffer by forwarding every
/// `on_resize` to [`set_viewport`](Self::set_viewport).
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    aspect: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_radians: fov_y_degrees.to_radians(),
            near,
            far,
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            aspect: 1.0,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Places the eye on a circle of `radius` around the target at `height`.
    pub fn orbit(&mut self, angle: f32, radius: f32, height: f32) {
        self.eye = self.target + Vec3::new(angle.cos() * radius, height, angle.sin() * radius);
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 0.1, 100.0)
    }
}

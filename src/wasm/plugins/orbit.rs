//! Rings of points orbiting in 3D, seen through a perspective camera.

use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlUniformLocation, WebGlVertexArrayObject};

use crate::audio::AudioFrame;
use crate::error::VizError;
use crate::shader::ShaderLoader;
use crate::viz::{PerspectiveCamera, Readiness, SurfaceLease, SurfaceSlot, Viewport, Visualization};
use crate::wasm::gl::{GlTarget, PendingProgram};
use crate::wasm::stage::Stage;

const RINGS: usize = 6;
const POINTS_PER_RING: usize = 160;

struct Program {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    view_projection: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    bands: Option<WebGlUniformLocation>,
}

pub struct OrbitField {
    lease: Option<SurfaceLease<Stage>>,
    shaders: ShaderLoader,
    vertex_path: String,
    fragment_path: String,
    viewport: Viewport,
    camera: PerspectiveCamera,
    target: Option<GlTarget>,
    pending: Option<PendingProgram>,
    program: Option<Program>,
}

impl OrbitField {
    pub fn new(
        stage: &SurfaceSlot<Stage>,
        shaders: ShaderLoader,
        vertex_path: &str,
        fragment_path: &str,
        viewport: Viewport,
    ) -> Result<Self, VizError> {
        let mut camera = PerspectiveCamera::new(55.0, 0.1, 50.0);
        camera.set_viewport(viewport);
        Ok(Self {
            lease: Some(stage.acquire()?),
            shaders,
            vertex_path: vertex_path.to_string(),
            fragment_path: fragment_path.to_string(),
            viewport,
            camera,
            target: None,
            pending: None,
            program: None,
        })
    }

    /// One `(angle, ring)` pair per point.
    fn geometry() -> Vec<f32> {
        let mut points = Vec::with_capacity(RINGS * POINTS_PER_RING * 2);
        for ring in 0..RINGS {
            for i in 0..POINTS_PER_RING {
                points.push(i as f32 / POINTS_PER_RING as f32 * std::f32::consts::TAU);
                points.push(ring as f32);
            }
        }
        points
    }

    fn build(target: &mut GlTarget, program: WebGlProgram) -> Result<Program, VizError> {
        target.adopt_program(&program);
        let vao = target.create_vertex_array()?;
        target.gl.bind_vertex_array(Some(&vao));
        target.create_array_buffer(&Self::geometry())?;
        target.gl.enable_vertex_attrib_array(0);
        target
            .gl
            .vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, 0, 0);
        target.gl.bind_vertex_array(None);

        Ok(Program {
            view_projection: target.uniform(&program, "u_view_proj"),
            time: target.uniform(&program, "u_time"),
            bands: target.uniform(&program, "u_bands"),
            program,
            vao,
        })
    }
}

impl Visualization for OrbitField {
    fn initialize(&mut self) -> Result<(), VizError> {
        let lease = self
            .lease
            .as_ref()
            .ok_or_else(|| VizError::Context("stage already released".into()))?;
        self.target = Some(GlTarget::mount(lease, self.viewport, "orbit")?);
        self.pending = Some(PendingProgram::spawn(
            &self.shaders,
            &self.vertex_path,
            &self.fragment_path,
        ));
        Ok(())
    }

    fn poll_ready(&mut self) -> Readiness {
        if self.program.is_some() {
            return Readiness::Ready;
        }
        let (Some(target), Some(pending)) = (self.target.as_mut(), self.pending.as_ref()) else {
            return Readiness::Failed(VizError::Context("not initialized".into()));
        };
        let Some(linked) = pending.poll(&target.gl) else {
            return Readiness::Pending;
        };
        self.pending = None;
        match linked.and_then(|program| Self::build(target, program)) {
            Ok(program) => {
                self.program = Some(program);
                Readiness::Ready
            }
            Err(e) => Readiness::Failed(e),
        }
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
        if let Some(target) = &self.target {
            target.resize(viewport);
        }
    }

    fn draw(&mut self, frame: &AudioFrame) -> Result<(), VizError> {
        let (Some(target), Some(program)) = (&self.target, &self.program) else {
            return Ok(());
        };
        let t = frame.elapsed_seconds as f32;
        let (bass, mid, treble) = if frame.has_audio {
            (frame.bands.bass, frame.bands.mid, frame.bands.treble)
        } else {
            (0.3 + 0.2 * (t * 1.1).sin(), 0.2, 0.1)
        };

        self.camera.orbit(t * 0.2, 6.0, 2.0 + mid * 2.0);
        let view_projection = self.camera.view_projection();

        let gl = &target.gl;
        gl.clear_color(0.01, 0.01, 0.03, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);

        gl.use_program(Some(&program.program));
        gl.uniform_matrix4fv_with_f32_array(
            program.view_projection.as_ref(),
            false,
            &view_projection.to_cols_array(),
        );
        gl.uniform1f(program.time.as_ref(), t);
        gl.uniform4f(program.bands.as_ref(), bass, mid, treble, frame.bands.total);

        gl.bind_vertex_array(Some(&program.vao));
        gl.draw_arrays(GL::POINTS, 0, (RINGS * POINTS_PER_RING) as i32);
        gl.bind_vertex_array(None);
        Ok(())
    }

    fn dispose(&mut self) {
        self.pending = None;
        self.program = None;
        if let Some(mut target) = self.target.take() {
            target.release();
        }
        self.lease = None;
    }
}

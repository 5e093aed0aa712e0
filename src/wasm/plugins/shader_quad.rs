//! Full-screen fragment shader driven by the band energies.

use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlUniformLocation, WebGlVertexArrayObject};

use crate::audio::AudioFrame;
use crate::error::VizError;
use crate::shader::ShaderLoader;
use crate::viz::{Readiness, SurfaceLease, SurfaceSlot, Viewport, Visualization};
use crate::wasm::gl::{GlTarget, PendingProgram};
use crate::wasm::stage::Stage;

const QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

struct Uniforms {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    bass: Option<WebGlUniformLocation>,
    mid: Option<WebGlUniformLocation>,
    treble: Option<WebGlUniformLocation>,
    total: Option<WebGlUniformLocation>,
}

struct Program {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    uniforms: Uniforms,
}

pub struct ShaderQuad {
    lease: Option<SurfaceLease<Stage>>,
    shaders: ShaderLoader,
    vertex_path: String,
    fragment_path: String,
    viewport: Viewport,
    target: Option<GlTarget>,
    pending: Option<PendingProgram>,
    program: Option<Program>,
}

impl ShaderQuad {
    pub fn new(
        stage: &SurfaceSlot<Stage>,
        shaders: ShaderLoader,
        vertex_path: &str,
        fragment_path: &str,
        viewport: Viewport,
    ) -> Result<Self, VizError> {
        Ok(Self {
            lease: Some(stage.acquire()?),
            shaders,
            vertex_path: vertex_path.to_string(),
            fragment_path: fragment_path.to_string(),
            viewport,
            target: None,
            pending: None,
            program: None,
        })
    }

    fn build(target: &mut GlTarget, program: WebGlProgram) -> Result<Program, VizError> {
        target.adopt_program(&program);
        let vao = target.create_vertex_array()?;
        target.gl.bind_vertex_array(Some(&vao));
        target.create_array_buffer(&QUAD)?;
        target.gl.enable_vertex_attrib_array(0);
        target
            .gl
            .vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, 0, 0);
        target.gl.bind_vertex_array(None);

        let uniforms = Uniforms {
            time: target.uniform(&program, "u_time"),
            resolution: target.uniform(&program, "u_resolution"),
            bass: target.uniform(&program, "u_bass"),
            mid: target.uniform(&program, "u_mid"),
            treble: target.uniform(&program, "u_treble"),
            total: target.uniform(&program, "u_total"),
        };
        Ok(Program {
            program,
            vao,
            uniforms,
        })
    }
}

impl Visualization for ShaderQuad {
    fn initialize(&mut self) -> Result<(), VizError> {
        let lease = self
            .lease
            .as_ref()
            .ok_or_else(|| VizError::Context("stage already released".into()))?;
        self.target = Some(GlTarget::mount(lease, self.viewport, "shader quad")?);
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
        let linked = match pending.poll(&target.gl) {
            None => return Readiness::Pending,
            Some(linked) => linked,
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
        if let Some(target) = &self.target {
            target.resize(viewport);
        }
    }

    fn draw(&mut self, frame: &AudioFrame) -> Result<(), VizError> {
        let (Some(target), Some(program)) = (&self.target, &self.program) else {
            return Ok(());
        };
        let gl = &target.gl;
        let u = &program.uniforms;

        // Without audio, a slow pulse keeps the shader moving.
        let bands = if frame.has_audio {
            frame.bands
        } else {
            let pulse = 0.25 + 0.15 * (frame.elapsed_seconds as f32 * 1.3).sin();
            crate::audio::Bands {
                bass: pulse,
                mid: pulse * 0.6,
                treble: pulse * 0.3,
                total: pulse * 0.5,
            }
        };

        gl.use_program(Some(&program.program));
        gl.uniform1f(u.time.as_ref(), frame.elapsed_seconds as f32);
        gl.uniform2f(
            u.resolution.as_ref(),
            self.viewport.width as f32,
            self.viewport.height as f32,
        );
        gl.uniform1f(u.bass.as_ref(), bands.bass);
        gl.uniform1f(u.mid.as_ref(), bands.mid);
        gl.uniform1f(u.treble.as_ref(), bands.treble);
        gl.uniform1f(u.total.as_ref(), bands.total);

        gl.bind_vertex_array(Some(&program.vao));
        gl.draw_arrays(GL::TRIANGLES, 0, 6);
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

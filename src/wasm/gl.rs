//! WebGL2 helpers shared by the shader-based visualizations.

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::describe;
use super::stage::{size_canvas, Stage};
use crate::error::{ReleaseError, VizError};
use crate::shader::{ShaderLoader, ShaderPair};
use crate::viz::{Deferred, ResourceBin, Viewport};

pub fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, VizError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| VizError::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(VizError::Shader(log))
    }
}

/// Compiles and links a program. Attribute 0 is bound to `a_position`.
pub fn link_program(gl: &GL, pair: &ShaderPair) -> Result<WebGlProgram, VizError> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, &pair.vertex)?;
    let fragment = match compile_shader(gl, GL::FRAGMENT_SHADER, &pair.fragment) {
        Ok(fragment) => fragment,
        Err(e) => {
            gl.delete_shader(Some(&vertex));
            return Err(e);
        }
    };

    let program = gl
        .create_program()
        .ok_or_else(|| VizError::Shader("unable to create program object".into()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.bind_attrib_location(&program, 0, "a_position");
    gl.link_program(&program);

    // Shaders are owned by the program once linked.
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(VizError::Shader(log))
    }
}

/// Shader sources requested from the loader, compiled once they arrive.
pub struct PendingProgram {
    sources: Deferred<ShaderPair>,
}

impl PendingProgram {
    pub fn spawn(loader: &ShaderLoader, vertex_path: &str, fragment_path: &str) -> Self {
        let (sources, completer) = Deferred::new();
        let load = loader.load_pair(vertex_path, fragment_path);
        spawn_local(async move {
            completer.complete(load.await);
        });
        Self { sources }
    }

    /// `None` while the sources are still in flight.
    pub fn poll(&self, gl: &GL) -> Option<Result<WebGlProgram, VizError>> {
        let sources = self.sources.take()?;
        Some(sources.map_err(VizError::from).and_then(|pair| link_program(gl, &pair)))
    }
}

/// Asks the browser to drop the context's GPU resources now rather than at GC.
pub fn lose_context(gl: &GL) -> Result<(), ReleaseError> {
    let extension = gl
        .get_extension("WEBGL_lose_context")
        .map_err(|e| ReleaseError(describe(&e)))?;
    let Some(extension) = extension else {
        return Ok(());
    };
    let lose = Reflect::get(&extension, &"loseContext".into())
        .map_err(|e| ReleaseError(describe(&e)))?
        .dyn_into::<Function>()
        .map_err(|_| ReleaseError("loseContext is not callable".into()))?;
    lose.call0(&extension)
        .map(|_| ())
        .map_err(|e| ReleaseError(describe(&e)))
}

/// A WebGL2 canvas mounted on the stage together with every GL object
/// created through it.
pub struct GlTarget {
    pub canvas: HtmlCanvasElement,
    pub gl: GL,
    resources: ResourceBin,
}

impl GlTarget {
    pub fn mount(stage: &Stage, viewport: Viewport, owner: &'static str) -> Result<Self, VizError> {
        let (canvas, gl) = stage.mount_webgl2(viewport)?;
        let mut resources = ResourceBin::new(owner);
        // Registered first so it runs after every object below is deleted.
        let context = gl.clone();
        resources.push("webgl context", move || lose_context(&context));
        gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
        Ok(Self {
            canvas,
            gl,
            resources,
        })
    }

    pub fn resize(&self, viewport: Viewport) {
        size_canvas(&self.canvas, viewport);
        self.gl
            .viewport(0, 0, viewport.width as i32, viewport.height as i32);
    }

    pub fn adopt_program(&mut self, program: &WebGlProgram) {
        let gl = self.gl.clone();
        let program = program.clone();
        self.resources.push("program", move || {
            gl.delete_program(Some(&program));
            Ok(())
        });
    }

    pub fn create_vertex_array(&mut self) -> Result<WebGlVertexArrayObject, VizError> {
        let vao = self
            .gl
            .create_vertex_array()
            .ok_or_else(|| VizError::Context("unable to create vertex array".into()))?;
        let gl = self.gl.clone();
        let tracked = vao.clone();
        self.resources.push("vertex array", move || {
            gl.delete_vertex_array(Some(&tracked));
            Ok(())
        });
        Ok(vao)
    }

    /// Uploads `data` into a new static array buffer, left bound to `ARRAY_BUFFER`.
    pub fn create_array_buffer(&mut self, data: &[f32]) -> Result<WebGlBuffer, VizError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| VizError::Context("unable to create buffer".into()))?;
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        self.gl
            .buffer_data_with_u8_array(GL::ARRAY_BUFFER, &bytes, GL::STATIC_DRAW);

        let gl = self.gl.clone();
        let tracked = buffer.clone();
        self.resources.push("array buffer", move || {
            gl.delete_buffer(Some(&tracked));
            Ok(())
        });
        Ok(buffer)
    }

    pub fn uniform(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    /// Deletes all GL objects and drops the context. Returns the failure count.
    pub fn release(&mut self) -> usize {
        self.resources.release_all()
    }
}

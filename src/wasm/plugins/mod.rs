//! Visualizations shipped with the crate, registered under their mode ids.

mod frequency;
mod orbit;
mod shader_quad;
mod waveform;

use frequency::FrequencyBars;
use orbit::OrbitField;
use shader_quad::ShaderQuad;
use waveform::Oscilloscope;

use super::stage::Stage;
use crate::shader::{ShaderLoader, ShaderPaths};
use crate::viz::{Registry, SurfaceSlot, Visualization};

/// Full-screen fragment shaders registered under their file name.
const SHADER_MODES: [&str; 2] = ["plasma", "tunnel"];

pub struct PluginContext {
    pub stage: SurfaceSlot<Stage>,
    pub shaders: ShaderLoader,
    pub paths: ShaderPaths,
}

pub fn register_all(registry: &mut Registry, ctx: &PluginContext) {
    let stage = ctx.stage.clone();
    registry.register("frequency", move |viewport| {
        Ok(Box::new(FrequencyBars::new(&stage, viewport)?) as Box<dyn Visualization>)
    });

    let stage = ctx.stage.clone();
    registry.register("waveform", move |viewport| {
        Ok(Box::new(Oscilloscope::new(&stage, viewport)?) as Box<dyn Visualization>)
    });

    let stage = ctx.stage.clone();
    let shaders = ctx.shaders.clone();
    let vertex = ctx.paths.vertex("orbit");
    let fragment = ctx.paths.fragment("orbit");
    registry.register("orbit", move |viewport| {
        let orbit = OrbitField::new(&stage, shaders.clone(), &vertex, &fragment, viewport)?;
        Ok(Box::new(orbit) as Box<dyn Visualization>)
    });

    for name in SHADER_MODES {
        let stage = ctx.stage.clone();
        let shaders = ctx.shaders.clone();
        let vertex = ctx.paths.basic_vertex();
        let fragment = ctx.paths.fragment(name);
        registry.register(name, move |viewport| {
            let quad = ShaderQuad::new(&stage, shaders.clone(), &vertex, &fragment, viewport)?;
            Ok(Box::new(quad) as Box<dyn Visualization>)
        });
    }
}

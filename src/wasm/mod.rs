//! Browser bindings: entry point, the JS-facing `Visualizer` handle, and the
//! WebAudio / WebGL / fetch implementations behind the core traits.

mod fetch;
mod gl;
mod microphone;
mod plugins;
mod render;
mod stage;
mod status;

use std::rc::Rc;

use log::info;
use wasm_bindgen::prelude::*;

use crate::config::VisualizerConfig;
use crate::error::ConfigError;
use crate::render_loop::{LoopState, RenderLoop};
use crate::resize::ResizeCoordinator;
use crate::shader::{ShaderLoader, ShaderPaths};
use crate::viz::{Registry, SurfaceSlot};

use fetch::HttpFetch;
use microphone::AnalyserSettings;
use plugins::PluginContext;
use render::Driver;
use stage::Stage;
use status::DomStatus;

#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Debug).ok();
    info!("sonic_viz loaded");
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Application context: owns the render loop (with its registry), the shader
/// loader and the frame driver. Create one per page.
#[wasm_bindgen]
pub struct Visualizer {
    driver: Driver,
}

#[wasm_bindgen]
impl Visualizer {
    /// `config` may be omitted; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Visualizer, JsValue> {
        let config: VisualizerConfig = if config.is_undefined() || config.is_null() {
            VisualizerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| to_js(ConfigError::Parse(e.to_string())))?
        };
        config.validate().map_err(to_js)?;

        let stage = SurfaceSlot::new(Stage::find(&config.stage_element_id)?);
        let shaders = ShaderLoader::new(Rc::new(HttpFetch));

        let mut registry = Registry::new();
        plugins::register_all(
            &mut registry,
            &PluginContext {
                stage: stage.clone(),
                shaders,
                paths: ShaderPaths::new(config.shader_base.as_str()),
            },
        );

        let render_loop = RenderLoop::new(
            registry,
            config.initial_mode.as_str(),
            ResizeCoordinator::new(config.max_canvas_dimension),
            Box::new(DomStatus::new(config.status_element_id.as_deref())),
        );
        let settings = AnalyserSettings {
            fft_size: config.fft_size,
            smoothing_time_constant: config.smoothing_time_constant,
            microphone: config.microphone,
        };

        info!("visualizer ready, initial mode '{}'", config.initial_mode);
        Ok(Visualizer {
            driver: Driver::new(render_loop, stage, settings)?,
        })
    }

    pub fn start(&self) {
        self.driver.start();
    }

    pub fn stop(&self) {
        self.driver.stop();
    }

    #[wasm_bindgen(js_name = switchVisualization)]
    pub fn switch_visualization(&self, id: &str) {
        self.driver.switch_visualization(id);
    }

    /// Re-reads the stage size, e.g. after a layout change that fired no window resize.
    pub fn resize(&self) {
        self.driver.resize();
    }

    /// Registered mode ids.
    pub fn modes(&self) -> js_sys::Array {
        self.driver
            .render_loop()
            .registry()
            .ids()
            .map(JsValue::from_str)
            .collect()
    }

    pub fn state(&self) -> String {
        match self.driver.render_loop().state() {
            LoopState::Idle => "idle",
            LoopState::Requesting => "requesting",
            LoopState::Active => "active",
            LoopState::Error => "error",
        }
        .to_string()
    }

    #[wasm_bindgen(getter, js_name = activeMode)]
    pub fn active_mode(&self) -> Option<String> {
        self.driver.render_loop().active_id().map(str::to_string)
    }
}

//! Audio-reactive visualizer for the browser.
//!
//! The platform-independent pipeline (band extraction, visualization
//! contract, registry, render loop, resize and shader caching) builds on any
//! target. The browser bindings that feed it live in `wasm` and only compile
//! for wasm32.

pub mod audio;
pub mod config;
pub mod error;
pub mod render_loop;
pub mod resize;
pub mod shader;
pub mod viz;

pub use audio::{compute_bands, AudioFrame, Bands, CaptureSession};
pub use config::VisualizerConfig;
pub use render_loop::{LoopControl, LoopState, RenderLoop, Status, StatusSink};
pub use resize::ResizeCoordinator;
pub use shader::{ShaderLoader, ShaderPair};
pub use viz::{Readiness, Registry, Viewport, Visualization};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::Visualizer;

//! Audio side of the pipeline: capture session, per-frame snapshot and band extraction.

pub mod bands;
pub mod capture;
pub mod frame;

pub use bands::{compute_bands, Bands};
pub use capture::{AudioAnalyser, CaptureSession};
pub use frame::{AudioFrame, FrameClock};

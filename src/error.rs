//! Error types shared by the core pipeline and the browser layer.

use thiserror::Error;

/// Failure inside a single visualization instance.
#[derive(Debug, Clone, Error)]
pub enum VizError {
    /// Another instance still holds the drawing surface.
    #[error("drawing surface is already leased")]
    SurfaceBusy,

    /// The canvas could not provide the requested rendering context.
    #[error("rendering context unavailable: {0}")]
    Context(String),

    /// GLSL compilation or program linking failed.
    #[error("shader program failed: {0}")]
    Shader(String),

    /// An external asset needed by the instance could not be loaded.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Per-frame drawing failed.
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Why a registered mode could not be made active.
#[derive(Debug, Clone, Error)]
pub enum ActivationError {
    #[error("unknown visualization '{0}'")]
    Unknown(String),

    #[error("visualization '{id}' is unavailable: {source}")]
    Unavailable {
        id: String,
        #[source]
        source: VizError,
    },
}

/// Microphone acquisition or audio graph failure.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The host has no media devices or no audio context support.
    #[error("audio capture unsupported: {0}")]
    Unsupported(String),

    /// The user (or browser policy) refused microphone access.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// Building or tearing down the analysis graph failed.
    #[error("audio graph error: {0}")]
    Graph(String),
}

/// Shader or other text asset fetch failure.
///
/// `Clone` because one in-flight fetch is shared by every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("fetch of '{path}' failed: {reason}")]
    Fetch { path: String, reason: String },

    #[error("fetch of '{path}' returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("response for '{path}' is not text")]
    NotText { path: String },
}

/// Rejected visualizer configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fft size {0} must be a power of two between 32 and 32768")]
    InvalidFftSize(u32),

    #[error("smoothing time constant {0} must be within [0, 1]")]
    InvalidSmoothing(f64),

    #[error("maximum canvas dimension must be at least 1")]
    InvalidDimension,

    #[error("initial mode must not be empty")]
    EmptyMode,

    #[error("could not parse configuration: {0}")]
    Parse(String),
}

/// One resource that refused to be released.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ReleaseError(pub String);

//! Frame scheduler core: session lifecycle, mode switching and per-frame dispatch.
//!
//! This type never touches the host's frame-timing primitive. A driver calls
//! [`RenderLoop::tick`] from its animation-frame callback and requests the next
//! frame while `tick` returns [`LoopControl::Continue`].

use std::fmt;

use log::{debug, error, info, warn};

use crate::audio::{AudioFrame, CaptureSession, FrameClock};
use crate::error::{ActivationError, CaptureError, VizError};
use crate::resize::ResizeCoordinator;
use crate::viz::{Readiness, Registry, Viewport, Visualization};

/// Draw failures are logged on the first occurrence and then every this many frames.
const DRAW_FAILURE_LOG_INTERVAL: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    /// Waiting for the microphone request to resolve.
    Requesting,
    Active,
    /// The last start failed; no resources are held and `start` may be retried.
    Error,
}

/// Human-readable state reported to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Requesting,
    Active,
    MicrophoneDenied,
    Stopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Requesting => "Requesting microphone access...",
            Status::Active => "Visualization active",
            Status::MicrophoneDenied => "Error: Could not access microphone",
            Status::Stopped => "Visualization stopped",
        })
    }
}

pub trait StatusSink {
    fn publish(&self, status: Status);
}

/// Identifies one `begin_start` so that a late microphone grant can be told
/// apart from the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Halt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks that reached a drawn visualization.
    pub frames: u64,
    /// Ticks that drew nothing: no visualization ready, or its draw failed.
    pub skipped_frames: u64,
    pub draw_failures: u64,
}

enum FrameOutcome {
    Drawn,
    Pending,
    DrawFailed(VizError),
    InitFailed(VizError),
}

struct ActiveVisualization {
    id: String,
    instance: Box<dyn Visualization>,
    ready: bool,
    draw_failures: u64,
}

impl ActiveVisualization {
    fn new(id: &str, instance: Box<dyn Visualization>) -> Self {
        Self {
            id: id.to_string(),
            instance,
            ready: false,
            draw_failures: 0,
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.ready {
            self.instance.on_resize(viewport);
        }
    }

    fn frame(&mut self, frame: &AudioFrame, viewport: Viewport) -> FrameOutcome {
        if !self.ready {
            match self.instance.poll_ready() {
                Readiness::Ready => {
                    debug!("visualization '{}' ready", self.id);
                    self.ready = true;
                    self.instance.on_resize(viewport);
                }
                Readiness::Pending => return FrameOutcome::Pending,
                Readiness::Failed(e) => return FrameOutcome::InitFailed(e),
            }
        }
        match self.instance.draw(frame) {
            Ok(()) => FrameOutcome::Drawn,
            Err(e) => {
                self.draw_failures += 1;
                FrameOutcome::DrawFailed(e)
            }
        }
    }

    /// Disposes the instance. Consumes `self` so a retired instance can never draw again.
    fn retire(mut self) {
        debug!("disposing visualization '{}'", self.id);
        self.instance.dispose();
    }
}

pub struct RenderLoop {
    registry: Registry,
    status: Box<dyn StatusSink>,
    state: LoopState,
    selected: String,
    session: Option<CaptureSession>,
    active: Option<ActiveVisualization>,
    resize: ResizeCoordinator,
    clock: FrameClock,
    frame: AudioFrame,
    generation: u64,
    stats: LoopStats,
}

impl RenderLoop {
    pub fn new(
        registry: Registry,
        initial_mode: impl Into<String>,
        resize: ResizeCoordinator,
        status: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            registry,
            status,
            state: LoopState::Idle,
            selected: initial_mode.into(),
            session: None,
            active: None,
            resize,
            clock: FrameClock::new(),
            frame: AudioFrame::default(),
            generation: 0,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mode that is, or will be on the next start, active.
    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.id.as_str())
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn viewport(&self) -> Viewport {
        self.resize.current()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn resize_coordinator_mut(&mut self) -> &mut ResizeCoordinator {
        &mut self.resize
    }

    /// Moves to `Requesting`. Returns `None` if a start is already under way
    /// or the loop is running.
    pub fn begin_start(&mut self) -> Option<StartTicket> {
        match self.state {
            LoopState::Requesting | LoopState::Active => {
                debug!("start ignored while {:?}", self.state);
                None
            }
            LoopState::Idle | LoopState::Error => {
                self.generation += 1;
                self.state = LoopState::Requesting;
                self.status.publish(Status::Requesting);
                Some(StartTicket(self.generation))
            }
        }
    }

    /// Delivers the outcome of the microphone request issued for `ticket`.
    pub fn complete_start(
        &mut self,
        ticket: StartTicket,
        session: Result<CaptureSession, CaptureError>,
    ) {
        if ticket.0 != self.generation || self.state != LoopState::Requesting {
            match session {
                Ok(session) => {
                    debug!("discarding capture session for an abandoned start");
                    session.close();
                }
                Err(e) => debug!("abandoned start failed: {e}"),
            }
            return;
        }

        match session {
            Ok(session) => {
                self.clock.reset();
                self.session = Some(session);
                let id = self.selected.clone();
                self.activate(&id);
                self.state = LoopState::Active;
                self.status.publish(Status::Active);
            }
            Err(e) => {
                error!("could not start capture: {e}");
                self.state = LoopState::Error;
                self.status.publish(Status::MicrophoneDenied);
            }
        }
    }

    /// Makes `id` the selected mode; if running, swaps the active instance.
    ///
    /// The outgoing instance is disposed before the incoming one is built, so
    /// the two never coexist.
    pub fn switch_visualization(&mut self, id: &str) {
        self.selected = id.to_string();
        if self.state != LoopState::Active {
            return;
        }
        if let Some(previous) = self.active.take() {
            previous.retire();
        }
        self.activate(id);
    }

    /// Runs one frame. Returns `Halt` once the loop is no longer active.
    pub fn tick(&mut self, now_ms: f64) -> LoopControl {
        if self.state != LoopState::Active {
            return LoopControl::Halt;
        }
        self.refresh_frame(now_ms);

        let viewport = self.resize.current();
        let outcome = match self.active.as_mut() {
            Some(active) => active.frame(&self.frame, viewport),
            None => FrameOutcome::Pending,
        };

        match outcome {
            FrameOutcome::Drawn => self.stats.frames += 1,
            FrameOutcome::Pending => self.stats.skipped_frames += 1,
            FrameOutcome::DrawFailed(e) => {
                self.stats.skipped_frames += 1;
                self.stats.draw_failures += 1;
                if let Some(active) = &self.active {
                    if active.draw_failures % DRAW_FAILURE_LOG_INTERVAL == 1 {
                        warn!(
                            "visualization '{}' failed to draw ({} failures): {e}",
                            active.id, active.draw_failures
                        );
                    }
                }
            }
            FrameOutcome::InitFailed(e) => {
                self.stats.skipped_frames += 1;
                if let Some(active) = self.active.take() {
                    error!("visualization '{}' failed to initialize: {e}", active.id);
                    active.retire();
                }
            }
        }
        LoopControl::Continue
    }

    /// Pulls the audio frame for `now_ms`: live analysis while a capture
    /// session runs, otherwise an idle frame whose clock keeps advancing.
    pub fn pull_frame(&mut self, now_ms: f64) -> &AudioFrame {
        self.refresh_frame(now_ms);
        &self.frame
    }

    fn refresh_frame(&mut self, now_ms: f64) {
        let elapsed = self.clock.elapsed(now_ms);
        match self.session.as_mut() {
            Some(session) => session.pull_into(&mut self.frame, elapsed),
            None => self.frame.make_idle(elapsed),
        }
    }

    /// Records a new layout size and forwards it to the active instance.
    pub fn resize(&mut self, css_width: f64, css_height: f64) -> Viewport {
        let viewport = self.resize.apply(css_width, css_height);
        if let Some(active) = self.active.as_mut() {
            active.resize(viewport);
        }
        viewport
    }

    /// Disposes the active instance, releases the capture session and returns
    /// to `Idle`. Stopping an idle loop does nothing.
    pub fn stop(&mut self) {
        match self.state {
            LoopState::Idle => return,
            LoopState::Error => {
                self.state = LoopState::Idle;
                return;
            }
            LoopState::Requesting | LoopState::Active => {}
        }

        // Invalidates any outstanding start ticket.
        self.generation += 1;
        if let Some(active) = self.active.take() {
            active.retire();
        }
        if let Some(session) = self.session.take() {
            session.close();
        }
        self.state = LoopState::Idle;
        self.status.publish(Status::Stopped);
    }

    fn activate(&mut self, id: &str) {
        let viewport = self.resize.current();
        match self.registry.instantiate(id, viewport) {
            Ok(instance) => {
                info!("visualization '{id}' activated at {}x{}", viewport.width, viewport.height);
                self.active = Some(ActiveVisualization::new(id, instance));
            }
            Err(ActivationError::Unknown(_)) => {
                // Already logged by the registry lookup.
                self.active = None;
            }
            Err(e @ ActivationError::Unavailable { .. }) => {
                warn!("continuing without a visualization: {e}");
                self.active = None;
            }
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.retire();
        }
    }
}

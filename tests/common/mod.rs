#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sonic_viz::audio::{AudioAnalyser, CaptureSession};
use sonic_viz::error::{CaptureError, VizError};
use sonic_viz::render_loop::{RenderLoop, Status, StatusSink};
use sonic_viz::viz::{Completer, Deferred, Readiness, Registry, Viewport, Visualization};
use sonic_viz::{AudioFrame, ResizeCoordinator};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Initialize(&'static str),
    Resize(&'static str, u32, u32),
    Draw(&'static str, bool),
    Dispose(&'static str),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// How a recorded visualization misbehaves.
#[derive(Clone, Default)]
pub struct Behaviour {
    pub fail_initialize: bool,
    pub fail_draw: bool,
    /// When set, every built instance stays pending until the completer pushed here is completed.
    pub ready_signals: Option<Rc<RefCell<Vec<Completer<()>>>>>,
}

/// Visualization that records every lifecycle call.
pub struct Recorder {
    name: &'static str,
    log: EventLog,
    behaviour: Behaviour,
    pending: Option<Deferred<()>>,
}

impl Visualization for Recorder {
    fn initialize(&mut self) -> Result<(), VizError> {
        self.log.borrow_mut().push(Event::Initialize(self.name));
        if self.behaviour.fail_initialize {
            return Err(VizError::Context("no context in tests".into()));
        }
        Ok(())
    }

    fn poll_ready(&mut self) -> Readiness {
        let Some(pending) = &self.pending else {
            return Readiness::Ready;
        };
        match pending.take() {
            None => Readiness::Pending,
            Some(Ok(())) => {
                self.pending = None;
                Readiness::Ready
            }
            Some(Err(e)) => Readiness::Failed(e.into()),
        }
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.log
            .borrow_mut()
            .push(Event::Resize(self.name, viewport.width, viewport.height));
    }

    fn draw(&mut self, frame: &AudioFrame) -> Result<(), VizError> {
        self.log
            .borrow_mut()
            .push(Event::Draw(self.name, frame.has_audio));
        if self.behaviour.fail_draw {
            return Err(VizError::Draw("broken on purpose".into()));
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().push(Event::Dispose(self.name));
    }
}

pub fn recorder(
    name: &'static str,
    log: &EventLog,
    behaviour: Behaviour,
) -> impl Fn(Viewport) -> Result<Box<dyn Visualization>, VizError> + 'static {
    let log = Rc::clone(log);
    move |_viewport| {
        let pending = behaviour.ready_signals.as_ref().map(|signals| {
            let (deferred, completer) = Deferred::new();
            signals.borrow_mut().push(completer);
            deferred
        });
        Ok(Box::new(Recorder {
            name,
            log: Rc::clone(&log),
            behaviour: behaviour.clone(),
            pending,
        }) as Box<dyn Visualization>)
    }
}

pub fn count(log: &EventLog, event: &Event) -> usize {
    log.borrow().iter().filter(|e| *e == event).count()
}

pub fn position(log: &EventLog, event: &Event) -> Option<usize> {
    log.borrow().iter().position(|e| e == event)
}

pub fn draws(log: &EventLog, name: &'static str) -> usize {
    log.borrow()
        .iter()
        .filter(|e| matches!(e, Event::Draw(n, _) if *n == name))
        .count()
}

/// Analyser with a constant spectrum and a flat waveform.
pub struct FakeAnalyser {
    pub sample_rate: f32,
    pub fft_size: usize,
    pub level: u8,
    pub releases: Rc<Cell<u32>>,
    /// Makes `release` report a teardown failure after counting the attempt.
    pub fail_release: bool,
}

impl AudioAnalyser for FakeAnalyser {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn read_frequency(&mut self, out: &mut [u8]) {
        out.fill(self.level);
    }

    fn read_time_domain(&mut self, out: &mut [u8]) {
        out.fill(128);
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        self.releases.set(self.releases.get() + 1);
        if self.fail_release {
            return Err(CaptureError::Graph("context already closed".into()));
        }
        Ok(())
    }
}

pub fn session(releases: &Rc<Cell<u32>>) -> CaptureSession {
    CaptureSession::new(Box::new(FakeAnalyser {
        sample_rate: 44100.0,
        fft_size: 2048,
        level: 255,
        releases: Rc::clone(releases),
        fail_release: false,
    }))
}

/// A session whose analyser fails to tear down.
pub fn failing_session(releases: &Rc<Cell<u32>>) -> CaptureSession {
    CaptureSession::new(Box::new(FakeAnalyser {
        sample_rate: 44100.0,
        fft_size: 2048,
        level: 0,
        releases: Rc::clone(releases),
        fail_release: true,
    }))
}

#[derive(Clone, Default)]
pub struct StatusLog(pub Rc<RefCell<Vec<Status>>>);

impl StatusSink for StatusLog {
    fn publish(&self, status: Status) {
        self.0.borrow_mut().push(status);
    }
}

impl StatusLog {
    pub fn all(&self) -> Vec<Status> {
        self.0.borrow().clone()
    }
}

/// An idle loop with an 800x600 viewport.
pub fn render_loop(registry: Registry, initial_mode: &str) -> (RenderLoop, StatusLog) {
    let status = StatusLog::default();
    let mut render_loop = RenderLoop::new(
        registry,
        initial_mode,
        ResizeCoordinator::new(4096),
        Box::new(status.clone()),
    );
    render_loop.resize(800.0, 600.0);
    (render_loop, status)
}

/// Runs `begin_start` + a successful `complete_start`.
pub fn start(render_loop: &mut RenderLoop, releases: &Rc<Cell<u32>>) {
    let ticket = render_loop.begin_start().expect("loop should accept a start");
    render_loop.complete_start(ticket, Ok(session(releases)));
}

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{failing_session, session, FakeAnalyser};
use sonic_viz::audio::{AudioFrame, CaptureSession};

#[test]
fn frame_buffers_follow_the_analyser() {
    let releases = Rc::new(Cell::new(0));
    let mut session = session(&releases);

    let frame = session.pull_frame(1.5);
    assert!(frame.has_audio);
    assert_eq!(frame.frequency.len(), 1024);
    assert_eq!(frame.time_domain.len(), 2048);
    assert_eq!(frame.elapsed_seconds, 1.5);
    assert!((frame.bands.bass - 1.0).abs() < 1e-6);
    assert!((frame.bands.total - 1.0).abs() < 1e-6);
    assert!(frame.time_domain.iter().all(|&s| s == 128));
}

#[test]
fn reused_frame_is_resized_to_the_analyser() {
    let releases = Rc::new(Cell::new(0));
    let mut session = CaptureSession::new(Box::new(FakeAnalyser {
        sample_rate: 48000.0,
        fft_size: 256,
        level: 0,
        releases: Rc::clone(&releases),
        fail_release: false,
    }));

    let mut frame = AudioFrame::idle(0.0);
    frame.frequency = vec![9; 4096];
    session.pull_into(&mut frame, 0.25);

    assert_eq!(frame.frequency.len(), 128);
    assert_eq!(frame.time_domain.len(), 256);
    assert_eq!(frame.sample_rate, 48000.0);
    assert_eq!(frame.bands.total, 0.0);
    assert!((frame.bin_frequency(64) - 12000.0).abs() < 1e-3);
}

#[test]
fn closing_releases_once() {
    let releases = Rc::new(Cell::new(0));
    session(&releases).close();
    assert_eq!(releases.get(), 1);
}

#[test]
fn dropping_releases_once() {
    let releases = Rc::new(Cell::new(0));
    drop(session(&releases));
    assert_eq!(releases.get(), 1);
}

#[test]
fn failed_release_on_close_is_contained() {
    let releases = Rc::new(Cell::new(0));
    failing_session(&releases).close();
    // Attempted once; the later drop does not retry.
    assert_eq!(releases.get(), 1);
}

#[test]
fn failed_release_on_drop_is_contained() {
    let releases = Rc::new(Cell::new(0));
    let mut session = failing_session(&releases);
    assert!(session.pull_frame(0.0).has_audio);
    drop(session);
    assert_eq!(releases.get(), 1);
}

#[test]
fn failed_release_does_not_disturb_the_render_loop() {
    let releases = Rc::new(Cell::new(0));
    let (mut rl, _) = common::render_loop(sonic_viz::viz::Registry::new(), "none");

    let ticket = rl.begin_start().unwrap();
    rl.complete_start(ticket, Ok(failing_session(&releases)));
    rl.stop();

    assert_eq!(releases.get(), 1);
    assert_eq!(rl.state(), sonic_viz::render_loop::LoopState::Idle);
    assert!(!rl.has_session());
}

#[test]
fn idle_frame_has_no_audio() {
    let frame = AudioFrame::idle(3.0);
    assert!(!frame.has_audio);
    assert!(frame.frequency.is_empty());
    assert_eq!(frame.bin_frequency(10), 0.0);
    assert_eq!(frame.elapsed_seconds, 3.0);
}

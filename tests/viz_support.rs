use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sonic_viz::error::{ReleaseError, VizError};
use sonic_viz::viz::{Deferred, PerspectiveCamera, ResourceBin, Surface, SurfaceSlot, Viewport};
use sonic_viz::ResizeCoordinator;

#[derive(Default)]
struct CountingSurface {
    restores: Cell<u32>,
}

impl Surface for CountingSurface {
    fn restore(&self) {
        self.restores.set(self.restores.get() + 1);
    }
}

#[test]
fn surface_allows_one_lease_at_a_time() {
    let slot = SurfaceSlot::new(CountingSurface::default());

    let lease = slot.acquire().unwrap();
    assert!(slot.is_leased());
    assert!(matches!(slot.acquire(), Err(VizError::SurfaceBusy)));

    drop(lease);
    assert!(!slot.is_leased());
    assert_eq!(slot.peek().restores.get(), 1);

    let again = slot.clone().acquire().unwrap();
    assert_eq!(again.restores.get(), 1);
}

#[test]
fn completing_after_the_receiver_is_gone_is_a_no_op() {
    let (deferred, completer) = Deferred::<u32>::new();
    drop(deferred);
    assert!(!completer.complete(Ok(7)));

    let (deferred, completer) = Deferred::<u32>::new();
    assert!(!deferred.is_settled());
    assert!(completer.complete(Ok(7)));
    assert!(deferred.is_settled());
    assert_eq!(deferred.take(), Some(Ok(7)));
    assert_eq!(deferred.take(), None);
}

#[test]
fn resource_bin_releases_everything_in_reverse() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut bin = ResourceBin::new("test");
    for label in ["context", "buffer", "program"] {
        let order = Rc::clone(&order);
        bin.push(label, move || {
            order.borrow_mut().push(label);
            if label == "buffer" {
                Err(ReleaseError("already lost".into()))
            } else {
                Ok(())
            }
        });
    }
    assert_eq!(bin.len(), 3);

    assert_eq!(bin.release_all(), 1);
    assert!(bin.is_empty());
    assert_eq!(*order.borrow(), ["program", "buffer", "context"]);

    // Nothing is released twice.
    assert_eq!(bin.release_all(), 0);
}

#[test]
fn dropping_a_resource_bin_releases_it() {
    let released = Rc::new(Cell::new(false));
    {
        let mut bin = ResourceBin::new("test");
        let released = Rc::clone(&released);
        bin.push("stream", move || {
            released.set(true);
            Ok(())
        });
    }
    assert!(released.get());
}

#[test]
fn camera_aspect_follows_the_viewport() {
    let mut camera = PerspectiveCamera::default();
    camera.set_viewport(Viewport::new(1920, 1080));
    assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);

    camera.set_viewport(Viewport::new(600, 800));
    assert!((camera.aspect() - 0.75).abs() < 1e-6);
    assert!(camera.view_projection().is_finite());
}

#[test]
fn camera_orbit_keeps_its_distance() {
    let mut camera = PerspectiveCamera::default();
    camera.orbit(1.2, 4.0, 0.0);
    assert!((camera.eye.length() - 4.0).abs() < 1e-5);
}

#[test]
fn oversized_layouts_are_clamped_keeping_aspect() {
    let resize = ResizeCoordinator::new(2048);
    let viewport = resize.fit(4096.0, 1024.0);
    assert_eq!(viewport, Viewport::new(2048, 512));
}

#[test]
fn pixel_ratio_scales_the_drawing_buffer() {
    let mut resize = ResizeCoordinator::new(4096);
    resize.set_pixel_ratio(2.0);
    assert_eq!(resize.fit(400.0, 300.0), Viewport::new(800, 600));

    resize.set_pixel_ratio(f64::NAN);
    assert_eq!(resize.pixel_ratio(), 1.0);
}

#[test]
fn degenerate_layouts_yield_a_one_pixel_buffer() {
    let mut resize = ResizeCoordinator::new(4096);
    assert_eq!(resize.fit(0.0, 0.0), Viewport::new(1, 1));
    assert_eq!(resize.fit(-5.0, f64::INFINITY), Viewport::new(1, 1));

    assert_eq!(resize.apply(320.0, 0.0), Viewport::new(320, 1));
    assert_eq!(resize.current(), Viewport::new(320, 1));
}

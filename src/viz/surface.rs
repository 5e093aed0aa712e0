//! Exclusive handoff of the shared drawing surface.
//!
//! Exactly one visualization may own the surface at a time. Ownership is a
//! [`SurfaceLease`]; dropping it puts the surface back into a neutral state
//! so the next owner starts clean.

use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

use log::trace;

use crate::error::VizError;

pub trait Surface {
    /// Returns the surface to its neutral state, undoing whatever the last
    /// owner mounted or configured.
    fn restore(&self);
}

struct Shared<S> {
    surface: S,
    leased: Cell<bool>,
}

pub struct SurfaceSlot<S: Surface> {
    shared: Rc<Shared<S>>,
}

impl<S: Surface> SurfaceSlot<S> {
    pub fn new(surface: S) -> Self {
        Self {
            shared: Rc::new(Shared {
                surface,
                leased: Cell::new(false),
            }),
        }
    }

    pub fn acquire(&self) -> Result<SurfaceLease<S>, VizError> {
        if self.shared.leased.replace(true) {
            return Err(VizError::SurfaceBusy);
        }
        trace!("surface leased");
        Ok(SurfaceLease {
            shared: Rc::clone(&self.shared),
        })
    }

    pub fn is_leased(&self) -> bool {
        self.shared.leased.get()
    }

    /// Access without a lease, for host-side queries such as measuring the surface.
    pub fn peek(&self) -> &S {
        &self.shared.surface
    }
}

impl<S: Surface> Clone for SurfaceSlot<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

pub struct SurfaceLease<S: Surface> {
    shared: Rc<Shared<S>>,
}

impl<S: Surface> Deref for SurfaceLease<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.shared.surface
    }
}

impl<S: Surface> Drop for SurfaceLease<S> {
    fn drop(&mut self) {
        self.shared.surface.restore();
        self.shared.leased.set(false);
        trace!("surface returned");
    }
}

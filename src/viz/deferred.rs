use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::AssetError;

type Slot<T> = RefCell<Option<Result<T, AssetError>>>;

/// Receiving end of an asynchronous load owned by a visualization.
///
/// The visualization keeps the `Deferred`; the spawned task keeps the
/// [`Completer`]. The completer only holds a weak reference, so a load that
/// finishes after its visualization was disposed lands nowhere.
pub struct Deferred<T> {
    slot: Rc<Slot<T>>,
}

pub struct Completer<T> {
    slot: Weak<Slot<T>>,
}

impl<T> Deferred<T> {
    pub fn new() -> (Deferred<T>, Completer<T>) {
        let slot = Rc::new(RefCell::new(None));
        let completer = Completer {
            slot: Rc::downgrade(&slot),
        };
        (Deferred { slot }, completer)
    }

    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Takes the result out once it has arrived.
    pub fn take(&self) -> Option<Result<T, AssetError>> {
        self.slot.borrow_mut().take()
    }
}

impl<T> Completer<T> {
    /// Stores the result. Returns false if the receiver is gone.
    pub fn complete(self, result: Result<T, AssetError>) -> bool {
        match self.slot.upgrade() {
            Some(slot) => {
                *slot.borrow_mut() = Some(result);
                true
            }
            None => false,
        }
    }
}

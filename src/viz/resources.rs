use log::warn;

use crate::error::ReleaseError;

type Release = Box<dyn FnOnce() -> Result<(), ReleaseError>>;

/// Best-effort release of a group of resources.
///
/// Every release runs even if an earlier one failed; failures are logged and
/// counted, never propagated. Releases run in reverse registration order.
pub struct ResourceBin {
    owner: &'static str,
    entries: Vec<(&'static str, Release)>,
}

impl ResourceBin {
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            entries: Vec::new(),
        }
    }

    pub fn push<F>(&mut self, label: &'static str, release: F)
    where
        F: FnOnce() -> Result<(), ReleaseError> + 'static,
    {
        self.entries.push((label, Box::new(release)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs all pending releases and returns how many failed.
    pub fn release_all(&mut self) -> usize {
        let mut failures = 0;
        while let Some((label, release)) = self.entries.pop() {
            if let Err(e) = release() {
                failures += 1;
                warn!("{}: releasing {label} failed: {e}", self.owner);
            }
        }
        failures
    }
}

impl Drop for ResourceBin {
    fn drop(&mut self) {
        self.release_all();
    }
}

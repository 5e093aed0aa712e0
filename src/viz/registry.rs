//! Name-keyed table of visualization constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, error, warn};

use super::{Viewport, Visualization};
use crate::error::{ActivationError, VizError};

/// Builds a fresh instance sized to the given viewport.
pub type Factory = Rc<dyn Fn(Viewport) -> Result<Box<dyn Visualization>, VizError>>;

#[derive(Clone)]
pub struct Descriptor {
    id: String,
    factory: Factory,
}

impl Descriptor {
    pub fn build(&self, viewport: Viewport) -> Result<Box<dyn Visualization>, VizError> {
        (self.factory)(viewport)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor").field("id", &self.id).finish()
    }
}

#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Descriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`, replacing any earlier registration.
    /// Returns true if an entry was replaced.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> bool
    where
        F: Fn(Viewport) -> Result<Box<dyn Visualization>, VizError> + 'static,
    {
        let id = id.into();
        let descriptor = Descriptor {
            id: id.clone(),
            factory: Rc::new(factory),
        };
        let replaced = self.entries.insert(id.clone(), descriptor).is_some();
        if replaced {
            debug!("visualization '{id}' re-registered");
        }
        replaced
    }

    pub fn lookup(&self, id: &str) -> Option<&Descriptor> {
        let found = self.entries.get(id);
        if found.is_none() {
            warn!("no visualization registered as '{id}'");
        }
        found
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds and initializes the visualization registered as `id`.
    ///
    /// A factory or `initialize` failure makes the mode unavailable for this
    /// activation; a partially built instance is disposed before returning.
    pub fn instantiate(
        &self,
        id: &str,
        viewport: Viewport,
    ) -> Result<Box<dyn Visualization>, ActivationError> {
        let descriptor = self
            .lookup(id)
            .ok_or_else(|| ActivationError::Unknown(id.to_string()))?;

        let unavailable = |source: VizError| {
            error!("visualization '{id}' failed to initialize: {source}");
            ActivationError::Unavailable {
                id: id.to_string(),
                source,
            }
        };

        let mut instance = descriptor.build(viewport).map_err(unavailable)?;
        if let Err(e) = instance.initialize() {
            instance.dispose();
            return Err(unavailable(e));
        }
        Ok(instance)
    }
}

//! Memoizing loader for external GLSL sources.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use log::{debug, warn};

use crate::error::AssetError;

pub type FetchFuture = LocalBoxFuture<'static, Result<String, AssetError>>;

/// Retrieves a text asset by path.
pub trait Fetch {
    fn fetch_text(&self, path: &str) -> FetchFuture;
}

type Pending = Shared<LocalBoxFuture<'static, Result<Rc<str>, AssetError>>>;

/// Vertex and fragment source of one program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPair {
    pub vertex: Rc<str>,
    pub fragment: Rc<str>,
}

/// Caches shader text by path.
///
/// A path is fetched at most once while its load is pending or succeeded;
/// concurrent requests for the same path share one fetch. Failed loads are
/// evicted so a later request retries.
#[derive(Clone)]
pub struct ShaderLoader {
    fetcher: Rc<dyn Fetch>,
    cache: Rc<RefCell<HashMap<String, Pending>>>,
}

impl ShaderLoader {
    pub fn new(fetcher: Rc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            cache: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn load(&self, path: &str) -> impl Future<Output = Result<Rc<str>, AssetError>> + 'static {
        let (pending, _) = self.entry(path);
        self.settle(path, pending)
    }

    /// Loads a vertex and a fragment shader concurrently.
    ///
    /// Fails if either load fails. Entries this call created are evicted on
    /// failure; sources other loads already cached stay cached.
    pub fn load_pair(
        &self,
        vertex_path: &str,
        fragment_path: &str,
    ) -> impl Future<Output = Result<ShaderPair, AssetError>> + 'static {
        let (vertex_pending, vertex_created) = self.entry(vertex_path);
        let (fragment_pending, fragment_created) = self.entry(fragment_path);

        let created: Vec<(String, Pending)> = [
            (vertex_path, &vertex_pending, vertex_created),
            (fragment_path, &fragment_pending, fragment_created),
        ]
        .into_iter()
        .filter(|(_, _, created)| *created)
        .map(|(path, pending, _)| (path.to_string(), pending.clone()))
        .collect();

        let vertex = self.settle(vertex_path, vertex_pending);
        let fragment = self.settle(fragment_path, fragment_pending);
        let cache = Rc::clone(&self.cache);
        async move {
            match future::join(vertex, fragment).await {
                (Ok(vertex), Ok(fragment)) => Ok(ShaderPair { vertex, fragment }),
                (Err(e), _) | (_, Err(e)) => {
                    for (path, pending) in &created {
                        evict_entry(&cache, path, pending);
                    }
                    Err(e)
                }
            }
        }
    }

    /// Returns the in-flight or finished load for `path`, starting a fetch if
    /// there is none, and whether this call created the entry.
    fn entry(&self, path: &str) -> (Pending, bool) {
        let mut cache = self.cache.borrow_mut();
        if let Some(pending) = cache.get(path) {
            return (pending.clone(), false);
        }
        debug!("fetching shader {path}");
        let pending = self
            .fetcher
            .fetch_text(path)
            .map(|result| result.map(Rc::from))
            .boxed_local()
            .shared();
        cache.insert(path.to_string(), pending.clone());
        (pending, true)
    }

    fn settle(
        &self,
        path: &str,
        pending: Pending,
    ) -> impl Future<Output = Result<Rc<str>, AssetError>> + 'static {
        let cache = Rc::clone(&self.cache);
        let path = path.to_string();
        async move {
            let result = pending.clone().await;
            if let Err(e) = &result {
                warn!("shader load failed: {e}");
                evict_entry(&cache, &path, &pending);
            }
            result
        }
    }

    /// True if `path` has loaded successfully and is served from memory.
    pub fn is_cached(&self, path: &str) -> bool {
        self.cache
            .borrow()
            .get(path)
            .and_then(|pending| pending.peek())
            .is_some_and(|result| result.is_ok())
    }

    pub fn evict(&self, path: &str) {
        self.cache.borrow_mut().remove(path);
    }
}

/// Drops the entry for `path` only if it is still `pending`; a retry may already be in flight.
fn evict_entry(cache: &RefCell<HashMap<String, Pending>>, path: &str, pending: &Pending) {
    let mut cache = cache.borrow_mut();
    if cache.get(path).is_some_and(|p| p.ptr_eq(pending)) {
        cache.remove(path);
    }
}

/// Builds the conventional shader asset paths under a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    base: String,
}

impl ShaderPaths {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn vertex(&self, name: &str) -> String {
        format!("{}/{name}.vert.glsl", self.base)
    }

    pub fn fragment(&self, name: &str) -> String {
        format!("{}/{name}.frag.glsl", self.base)
    }

    /// The shared full-screen quad vertex shader.
    pub fn basic_vertex(&self) -> String {
        self.vertex("basic")
    }
}

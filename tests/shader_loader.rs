use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use futures::executor::block_on;
use futures::future::{self, FutureExt};
use sonic_viz::error::AssetError;
use sonic_viz::shader::{Fetch, FetchFuture, ShaderLoader, ShaderPaths};

/// Serves `source of <path>` for every path, except paths in `failing`.
#[derive(Default)]
struct FakeFetch {
    calls: RefCell<HashMap<String, u32>>,
    failing: RefCell<HashSet<String>>,
}

impl FakeFetch {
    fn calls(&self, path: &str) -> u32 {
        self.calls.borrow().get(path).copied().unwrap_or(0)
    }

    fn fail(&self, path: &str) {
        self.failing.borrow_mut().insert(path.to_string());
    }

    fn heal(&self, path: &str) {
        self.failing.borrow_mut().remove(path);
    }
}

impl Fetch for FakeFetch {
    fn fetch_text(&self, path: &str) -> FetchFuture {
        *self.calls.borrow_mut().entry(path.to_string()).or_default() += 1;
        let result = if self.failing.borrow().contains(path) {
            Err(AssetError::Status {
                path: path.to_string(),
                status: 404,
            })
        } else {
            Ok(format!("source of {path}"))
        };
        future::ready(result).boxed_local()
    }
}

fn loader() -> (ShaderLoader, Rc<FakeFetch>) {
    let fetch = Rc::new(FakeFetch::default());
    (ShaderLoader::new(fetch.clone()), fetch)
}

#[test]
fn repeated_loads_fetch_once() {
    let (loader, fetch) = loader();

    let first = block_on(loader.load("shaders/plasma.frag.glsl")).unwrap();
    let second = block_on(loader.load("shaders/plasma.frag.glsl")).unwrap();

    assert_eq!(&*first, "source of shaders/plasma.frag.glsl");
    assert_eq!(first, second);
    assert_eq!(fetch.calls("shaders/plasma.frag.glsl"), 1);
    assert!(loader.is_cached("shaders/plasma.frag.glsl"));
}

#[test]
fn concurrent_loads_share_one_fetch() {
    let (loader, fetch) = loader();

    let (a, b) = block_on(future::join(
        loader.load("shaders/basic.vert.glsl"),
        loader.load("shaders/basic.vert.glsl"),
    ));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(fetch.calls("shaders/basic.vert.glsl"), 1);
}

#[test]
fn failed_load_is_retried() {
    let (loader, fetch) = loader();
    fetch.fail("shaders/tunnel.frag.glsl");

    let error = block_on(loader.load("shaders/tunnel.frag.glsl")).unwrap_err();
    assert_eq!(
        error,
        AssetError::Status {
            path: "shaders/tunnel.frag.glsl".into(),
            status: 404
        }
    );
    assert!(!loader.is_cached("shaders/tunnel.frag.glsl"));

    fetch.heal("shaders/tunnel.frag.glsl");
    assert!(block_on(loader.load("shaders/tunnel.frag.glsl")).is_ok());
    assert_eq!(fetch.calls("shaders/tunnel.frag.glsl"), 2);
}

#[test]
fn failed_pair_caches_neither_shader() {
    let (loader, fetch) = loader();
    fetch.fail("shaders/orbit.frag.glsl");

    let result = block_on(loader.load_pair("shaders/orbit.vert.glsl", "shaders/orbit.frag.glsl"));
    assert!(result.is_err());
    assert!(!loader.is_cached("shaders/orbit.vert.glsl"));
    assert!(!loader.is_cached("shaders/orbit.frag.glsl"));

    fetch.heal("shaders/orbit.frag.glsl");
    let pair = block_on(loader.load_pair("shaders/orbit.vert.glsl", "shaders/orbit.frag.glsl"))
        .unwrap();
    assert_eq!(&*pair.vertex, "source of shaders/orbit.vert.glsl");
    assert_eq!(&*pair.fragment, "source of shaders/orbit.frag.glsl");
    assert_eq!(fetch.calls("shaders/orbit.vert.glsl"), 2);
}

#[test]
fn shared_vertex_shader_is_fetched_once_across_pairs() {
    let (loader, fetch) = loader();
    let paths = ShaderPaths::new("shaders");

    block_on(loader.load_pair(&paths.basic_vertex(), &paths.fragment("plasma"))).unwrap();
    block_on(loader.load_pair(&paths.basic_vertex(), &paths.fragment("tunnel"))).unwrap();

    assert_eq!(fetch.calls("shaders/basic.vert.glsl"), 1);
    assert!(loader.is_cached("shaders/plasma.frag.glsl"));
    assert!(loader.is_cached("shaders/tunnel.frag.glsl"));
}

#[test]
fn failed_pair_keeps_a_vertex_shader_cached_by_another_pair() {
    let (loader, fetch) = loader();
    let paths = ShaderPaths::new("shaders");
    fetch.fail("shaders/tunnel.frag.glsl");

    block_on(loader.load_pair(&paths.basic_vertex(), &paths.fragment("plasma"))).unwrap();
    let tunnel = block_on(loader.load_pair(&paths.basic_vertex(), &paths.fragment("tunnel")));
    assert!(tunnel.is_err());

    assert!(loader.is_cached("shaders/basic.vert.glsl"));
    assert!(!loader.is_cached("shaders/tunnel.frag.glsl"));
    block_on(loader.load("shaders/basic.vert.glsl")).unwrap();
    assert_eq!(fetch.calls("shaders/basic.vert.glsl"), 1);
}

#[test]
fn failed_pair_leaves_a_newer_retry_in_place() {
    let (loader, fetch) = loader();
    fetch.fail("shaders/orbit.frag.glsl");

    let failing = loader.load_pair("shaders/orbit.vert.glsl", "shaders/orbit.frag.glsl");
    // Drop the vertex entry and start a fresh load before the pair settles.
    loader.evict("shaders/orbit.vert.glsl");
    let retry = loader.load("shaders/orbit.vert.glsl");

    assert!(block_on(failing).is_err());
    assert!(block_on(retry).is_ok());
    assert!(loader.is_cached("shaders/orbit.vert.glsl"));
    assert_eq!(fetch.calls("shaders/orbit.vert.glsl"), 2);
}

#[test]
fn evicted_path_is_fetched_again() {
    let (loader, fetch) = loader();
    block_on(loader.load("a.glsl")).unwrap();
    loader.evict("a.glsl");
    assert!(!loader.is_cached("a.glsl"));

    block_on(loader.load("a.glsl")).unwrap();
    assert_eq!(fetch.calls("a.glsl"), 2);
}

#[test]
fn shader_paths_follow_the_naming_convention() {
    let paths = ShaderPaths::new("./shaders/");
    assert_eq!(paths.basic_vertex(), "./shaders/basic.vert.glsl");
    assert_eq!(paths.vertex("orbit"), "./shaders/orbit.vert.glsl");
    assert_eq!(paths.fragment("plasma"), "./shaders/plasma.frag.glsl");
}

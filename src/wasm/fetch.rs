use futures::FutureExt;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::describe;
use crate::error::AssetError;
use crate::shader::{Fetch, FetchFuture};

/// Fetches text assets with `window.fetch`, relative to the page.
pub struct HttpFetch;

impl Fetch for HttpFetch {
    fn fetch_text(&self, path: &str) -> FetchFuture {
        let path = path.to_string();
        async move {
            let failed = |reason: String| AssetError::Fetch {
                path: path.clone(),
                reason,
            };
            let window = web_sys::window().ok_or_else(|| failed("no window".into()))?;

            let response: Response = JsFuture::from(window.fetch_with_str(&path))
                .await
                .map_err(|e| failed(describe(&e)))?
                .dyn_into()
                .map_err(|e| failed(describe(&e)))?;
            if !response.ok() {
                return Err(AssetError::Status {
                    path: path.clone(),
                    status: response.status(),
                });
            }

            let body = response.text().map_err(|e| failed(describe(&e)))?;
            JsFuture::from(body)
                .await
                .map_err(|e| failed(describe(&e)))?
                .as_string()
                .ok_or_else(|| AssetError::NotText { path: path.clone() })
        }
        .boxed_local()
    }
}

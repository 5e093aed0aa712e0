//! The page element visualizations draw into.
//!
//! Each visualization mounts its own canvas while it holds the stage lease,
//! because a canvas bound to a 2D context cannot later hand out a WebGL2
//! context. Returning the lease removes that canvas.

use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement,
    WebGl2RenderingContext as GL,
};

use super::describe;
use crate::error::VizError;
use crate::viz::{Surface, Viewport};

pub struct Stage {
    document: Document,
    element: HtmlElement,
}

impl Stage {
    pub fn find(element_id: &str) -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let element = document
            .get_element_by_id(element_id)
            .ok_or_else(|| format!("stage element #{element_id} not found"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| format!("#{element_id} is not an HTML element"))?;
        Ok(Self { document, element })
    }

    /// Layout size of the stage in CSS pixels.
    pub fn client_size(&self) -> (f64, f64) {
        (
            f64::from(self.element.client_width()),
            f64::from(self.element.client_height()),
        )
    }

    fn mount_canvas(&self) -> Result<HtmlCanvasElement, VizError> {
        let context_error = |e: wasm_bindgen::JsValue| VizError::Context(describe(&e));
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(context_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| VizError::Context("created element is not a canvas".into()))?;
        canvas
            .set_attribute("style", "display:block;width:100%;height:100%")
            .map_err(context_error)?;
        self.element.append_child(&canvas).map_err(context_error)?;
        Ok(canvas)
    }

    pub fn mount_2d(
        &self,
        viewport: Viewport,
    ) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), VizError> {
        let canvas = self.mount_canvas()?;
        size_canvas(&canvas, viewport);
        let context = canvas
            .get_context("2d")
            .map_err(|e| VizError::Context(describe(&e)))?
            .ok_or_else(|| VizError::Context("2d context unsupported".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| VizError::Context("unexpected 2d context type".into()))?;
        Ok((canvas, context))
    }

    pub fn mount_webgl2(&self, viewport: Viewport) -> Result<(HtmlCanvasElement, GL), VizError> {
        let canvas = self.mount_canvas()?;
        size_canvas(&canvas, viewport);
        let gl = canvas
            .get_context("webgl2")
            .map_err(|e| VizError::Context(describe(&e)))?
            .ok_or_else(|| VizError::Context("WebGL2 not supported".into()))?
            .dyn_into::<GL>()
            .map_err(|_| VizError::Context("unexpected webgl2 context type".into()))?;
        Ok((canvas, gl))
    }
}

impl Surface for Stage {
    fn restore(&self) {
        self.element.set_text_content(None);
    }
}

pub fn size_canvas(canvas: &HtmlCanvasElement, viewport: Viewport) {
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);
}

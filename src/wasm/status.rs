use log::info;
use web_sys::Element;

use crate::render_loop::{Status, StatusSink};

/// Writes status text into a page element, when the page provides one.
pub struct DomStatus {
    element: Option<Element>,
}

impl DomStatus {
    pub fn new(element_id: Option<&str>) -> Self {
        let element = element_id.and_then(|id| {
            web_sys::window()?
                .document()?
                .get_element_by_id(id)
        });
        Self { element }
    }
}

impl StatusSink for DomStatus {
    fn publish(&self, status: Status) {
        info!("{status}");
        if let Some(element) = &self.element {
            element.set_text_content(Some(&status.to_string()));
        }
    }
}

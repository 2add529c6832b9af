use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement};

use crate::error::{Result, WebError};

/// Canvas the map draws into: an element id or the element itself.
#[derive(Debug, Clone)]
pub enum CanvasRef {
    /// Id of a `canvas` element.
    Id(String),
    /// The element.
    Element(HtmlCanvasElement),
}

impl CanvasRef {
    /// Accepts a string id or a canvas element passed from JavaScript.
    pub fn from_js(value: JsValue) -> Result<Self> {
        if let Some(id) = value.as_string() {
            return Ok(Self::Id(id));
        }

        value
            .dyn_into::<HtmlCanvasElement>()
            .map(Self::Element)
            .map_err(|value| WebError::Js(format!("{value:?} is neither an id nor a canvas")))
    }

    /// Finds the canvas element.
    pub fn resolve(self, document: &Document) -> Result<HtmlCanvasElement> {
        match self {
            CanvasRef::Element(canvas) => Ok(canvas),
            CanvasRef::Id(id) => document
                .get_element_by_id(&id)
                .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
                .ok_or(WebError::ElementNotFound(id)),
        }
    }
}

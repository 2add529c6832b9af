//! Error types of the browser binding.

use thiserror::Error;
use towermap::TowerMapError;
use wasm_bindgen::JsValue;

/// Result of the browser binding.
pub type Result<T> = std::result::Result<T, WebError>;

/// Browser binding error.
#[derive(Debug, Error)]
pub enum WebError {
    /// No element with the id, or the element has a different type.
    #[error("element '{0}' not found")]
    ElementNotFound(String),
    /// Exception thrown by JavaScript code.
    #[error("javascript error: {0}")]
    Js(String),
    /// Value could not cross the JavaScript boundary.
    #[error("failed to convert value: {0}")]
    Conversion(#[from] serde_wasm_bindgen::Error),
    /// Error of the map application.
    #[error(transparent)]
    Core(#[from] TowerMapError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<WebError> for JsValue {
    fn from(value: WebError) -> Self {
        JsValue::from_str(&value.to_string())
    }
}

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures raised while projecting a GeoJSON document.
///
/// All of these are caller mistakes (bad input or misuse). They abort the
/// current draw call; primitives emitted before the failure stay in the scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Invalid GeoJSON document type: {0}")]
    InvalidDocumentType(String),

    #[error("Invalid GeoJSON geometry type: {0}")]
    InvalidGeometryType(String),

    #[error("Invalid shape: {0} (expected \"sphere\" or \"plane\")")]
    InvalidShape(String),

    #[error("Malformed GeoJSON: {0}")]
    MalformedDocument(String),

    #[error("Invalid draw options: {0}")]
    InvalidOptions(String),

    #[error("Unknown scene: {0}")]
    UnknownScene(String),
}

impl From<ProjectionError> for JsValue {
    fn from(err: ProjectionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

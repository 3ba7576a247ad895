use wasm_bindgen::prelude::*;
use serde_wasm_bindgen::{from_value, to_value};

// Create a console module for logging
pub mod console;
// Error taxonomy shared by every operation
pub mod error;
// Draw options, shapes and colors
pub mod models;
// Typed GeoJSON geometries
pub mod geojson_features;
// Sphere / plane coordinate conversion
pub mod coordinates;
// Long segment bisection
#[path = "../geometry_functions/interpolate.rs"]
pub mod interpolate;
// Scene primitives and the scene capability
pub mod scene;
// The GeoJSON projector itself
pub mod projector;
// Flat buffer export for WebGL engines
pub mod buffer_geometry;
// Scenes registered from JS
mod module_state;

pub use buffer_geometry::{export_scene, BufferGeometry, BufferKind};
pub use error::ProjectionError;
pub use geojson_features::Geometry;
pub use models::{Color, DrawOptions, DrawSummary, Frame, Shape};
pub use projector::GeoProjector;
pub use scene::{LineGroup, PointsObject, Scene, SceneGraph, SceneObject};

use module_state::ModuleState;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => (crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("threegeo WASM module initialized");
    });
}

// Errors are logged before they cross into JS so a blank map never goes unexplained
fn report(err: ProjectionError) -> JsValue {
    console_warn!("{}", err);
    err.into()
}

fn parse_options(options: JsValue) -> Result<DrawOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(DrawOptions::default());
    }
    from_value(options).map_err(|e| report(ProjectionError::InvalidOptions(e.to_string())))
}

fn parse_document(geojson_json: &str) -> Result<serde_json::Value, JsValue> {
    serde_json::from_str(geojson_json)
        .map_err(|e| report(ProjectionError::MalformedDocument(e.to_string())))
}

/// Register an empty scene and return its id.
#[wasm_bindgen]
pub fn create_scene() -> String {
    ModuleState::with_mut(|state| state.create_scene())
}

#[wasm_bindgen]
pub fn free_scene(scene_id: &str) -> bool {
    ModuleState::with_mut(|state| state.free_scene(scene_id))
}

#[wasm_bindgen]
pub fn clear_scene(scene_id: &str) -> bool {
    ModuleState::with_mut(|state| match state.scene_mut(scene_id) {
        Ok(scene) => {
            scene.clear();
            true
        }
        Err(_) => false,
    })
}

/// Draw a GeoJSON document into a registered scene.
///
/// `shape` is `"sphere"` (uses `radius`) or `"plane"` (uses `options.width`
/// and `options.height`). Returns the draw summary.
#[wasm_bindgen]
pub fn draw_three_geo(
    scene_id: &str,
    geojson_json: &str,
    radius: Option<f64>,
    shape: &str,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let options = parse_options(options)?;
    let document = parse_document(geojson_json)?;

    let summary = ModuleState::with_mut(|state| {
        state.draw_into_scene(scene_id, &document, radius, shape, &options)
    })
    .map_err(report)?;

    Ok(to_value(&summary)?)
}

/// Remove every object tagged with `name`, returning how many were removed.
#[wasm_bindgen]
pub fn remove_named(scene_id: &str, name: &str) -> Result<u32, JsValue> {
    ModuleState::with_mut(|state| {
        state
            .scene_mut(scene_id)
            .map(|scene| scene.remove_named(name) as u32)
    })
    .map_err(report)
}

/// Flat position / index buffers for every object of a scene.
#[wasm_bindgen]
pub fn export_scene_buffers(scene_id: &str) -> Result<JsValue, JsValue> {
    let buffers = ModuleState::with(|state| state.scene(scene_id).map(export_scene))
        .map_err(report)?;
    Ok(to_value(&buffers)?)
}

/// Names of the objects of a scene, in scene order.
#[wasm_bindgen]
pub fn scene_object_names(scene_id: &str) -> Result<js_sys::Array, JsValue> {
    ModuleState::with(|state| {
        state.scene(scene_id).map(|scene| {
            scene
                .objects()
                .iter()
                .map(|object| JsValue::from_str(object.name()))
                .collect::<js_sys::Array>()
        })
    })
    .map_err(report)
}

/// One-shot projection into a throwaway scene, returning its buffers.
#[wasm_bindgen]
pub fn project_geojson(
    geojson_json: &str,
    radius: Option<f64>,
    shape: &str,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let options = parse_options(options)?;
    let document = parse_document(geojson_json)?;

    let mut projector = GeoProjector::new(SceneGraph::new());
    projector
        .draw(&document, radius, shape, &options)
        .map_err(report)?;

    Ok(to_value(&export_scene(projector.scene()))?)
}

/// Ids of every registered scene, sorted.
#[wasm_bindgen]
pub fn list_scenes() -> js_sys::Array {
    ModuleState::with(|state| {
        state
            .scene_ids()
            .into_iter()
            .map(JsValue::from)
            .collect::<js_sys::Array>()
    })
}

// Drop every registered scene and reset the draw counter
#[wasm_bindgen]
pub fn clear_all_scenes() {
    ModuleState::with_mut(|state| state.clear_all());
    console_log!("All scenes cleared");
}

#[wasm_bindgen]
pub fn get_scene_stats() -> Result<JsValue, JsValue> {
    let stats = ModuleState::with(|state| state.get_stats());
    Ok(to_value(&stats)?)
}

use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ProjectionError;
use crate::models::{DrawOptions, DrawSummary};
use crate::projector::GeoProjector;
use crate::scene::SceneGraph;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SceneStats {
    pub scenes: usize,
    pub objects: usize,
    pub draw_calls: usize,
}

// Scenes handed out to JS, keyed by id. Only scenes live here; projection
// scratch space belongs to each draw call.
pub struct ModuleState {
    scenes: HashMap<String, SceneGraph>,
    draw_calls: usize,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: Mutex<ModuleState> = Mutex::new(ModuleState::new());
}

impl Default for ModuleState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            scenes: HashMap::new(),
            draw_calls: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let mut guard = MODULE_STATE.lock();
        f(&mut guard)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        f(&guard)
    }

    pub fn create_scene(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.scenes.insert(id.clone(), SceneGraph::new());
        id
    }

    pub fn free_scene(&mut self, id: &str) -> bool {
        self.scenes.remove(id).is_some()
    }

    pub fn scene(&self, id: &str) -> Result<&SceneGraph, ProjectionError> {
        self.scenes
            .get(id)
            .ok_or_else(|| ProjectionError::UnknownScene(id.to_string()))
    }

    pub fn scene_mut(&mut self, id: &str) -> Result<&mut SceneGraph, ProjectionError> {
        self.scenes
            .get_mut(id)
            .ok_or_else(|| ProjectionError::UnknownScene(id.to_string()))
    }

    /// Draw a document into a registered scene.
    pub fn draw_into_scene(
        &mut self,
        id: &str,
        document: &Value,
        radius: Option<f64>,
        shape: &str,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError> {
        let scene = self.scene_mut(id)?;
        let result = GeoProjector::new(scene).draw(document, radius, shape, options);
        self.draw_calls += 1;
        result
    }

    pub fn scene_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.scenes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_stats(&self) -> SceneStats {
        SceneStats {
            scenes: self.scenes.len(),
            objects: self.scenes.values().map(SceneGraph::len).sum(),
            draw_calls: self.draw_calls,
        }
    }

    pub fn clear_all(&mut self) {
        self.scenes.clear();
        self.draw_calls = 0;
    }
}

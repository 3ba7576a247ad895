// Flattens scene objects into typed-array friendly buffers that a WebGL
// scene graph can turn into BufferGeometry objects without further math.
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::scene::{LineGroup, PointsObject, SceneGraph, SceneObject, Transform};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BufferKind {
    Points,
    Line,
    HitMesh,
}

// Output struct for one drawable
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BufferGeometry {
    pub kind: BufferKind,
    pub name: String,
    /// Index of the scene object this buffer was produced from
    pub object_index: usize,
    pub positions: Vec<f32>,
    pub indices: Option<Vec<u32>>,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub size: Option<f32>,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

fn flatten(vertices: &[Point3<f64>]) -> Vec<f32> {
    vertices
        .iter()
        .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
        .collect()
}

fn transform_arrays(transform: &Transform) -> ([f64; 3], [f64; 3], [f64; 3]) {
    (
        transform.position.into(),
        transform.rotation.into(),
        transform.scale.into(),
    )
}

fn points_buffer(points: &PointsObject, object_index: usize) -> BufferGeometry {
    let (position, rotation, scale) = transform_arrays(&points.transform);
    BufferGeometry {
        kind: BufferKind::Points,
        name: points.name.clone(),
        object_index,
        positions: flatten(std::slice::from_ref(&points.position)),
        indices: None,
        color: points.material.color.to_array(),
        opacity: 1.0,
        transparent: false,
        double_sided: false,
        size: Some(points.material.size as f32),
        position,
        rotation,
        scale,
    }
}

// A line group exports its line first, then the hit mesh; both carry the group transform
fn line_group_buffers(group: &LineGroup, object_index: usize) -> [BufferGeometry; 2] {
    let (position, rotation, scale) = transform_arrays(&group.transform);
    let positions = flatten(&group.line.vertices);

    let line = BufferGeometry {
        kind: BufferKind::Line,
        name: group.line.name.clone(),
        object_index,
        positions: positions.clone(),
        indices: None,
        color: group.line.material.color.to_array(),
        opacity: 1.0,
        transparent: false,
        double_sided: false,
        size: None,
        position,
        rotation,
        scale,
    };

    let material = &group.hit_mesh.material;
    let hit_mesh = BufferGeometry {
        kind: BufferKind::HitMesh,
        name: group.line.name.clone(),
        object_index,
        positions,
        indices: Some(group.hit_mesh.faces.iter().flatten().copied().collect()),
        color: material.color.to_array(),
        opacity: material.opacity,
        transparent: material.transparent,
        double_sided: material.double_sided,
        size: None,
        position,
        rotation,
        scale,
    };

    [line, hit_mesh]
}

/// Buffers for a single scene object.
pub fn object_buffers(object: &SceneObject, object_index: usize) -> Vec<BufferGeometry> {
    match object {
        SceneObject::Points(points) => vec![points_buffer(points, object_index)],
        SceneObject::LineGroup(group) => line_group_buffers(group, object_index).to_vec(),
    }
}

/// Buffers for every object of the scene, in scene order.
pub fn export_scene(scene: &SceneGraph) -> Vec<BufferGeometry> {
    scene
        .objects()
        .iter()
        .enumerate()
        .flat_map(|(index, object)| object_buffers(object, index))
        .collect()
}

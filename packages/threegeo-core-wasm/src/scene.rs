// Renderer-agnostic scene primitives and the minimal scene capability the
// projector draws into.
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

use crate::models::{Color, DrawOptions};

/// Position / rotation (Euler, radians) / scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    pub color: Color,
    pub transparent: bool,
    pub opacity: f32,
    pub double_sided: bool,
}

impl MeshMaterial {
    /// Fully transparent, double sided: only there to be hit by a ray caster.
    pub fn invisible() -> Self {
        MeshMaterial {
            color: Color::from_hex(0xffffff),
            transparent: true,
            opacity: 0.0,
            double_sided: true,
        }
    }
}

/// Vertex list shared between a line and its hit mesh.
pub type SharedVertices = Arc<[Point3<f64>]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub vertices: SharedVertices,
    pub material: LineMaterial,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: SharedVertices,
    pub faces: Vec<[u32; 3]>,
    pub material: MeshMaterial,
    pub transform: Transform,
}

/// A visible line plus an invisible mesh over the same vertices, so the
/// caller can detect the pointer hovering the line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub line: Line,
    pub hit_mesh: Mesh,
    pub transform: Transform,
}

impl LineGroup {
    pub fn new(vertices: impl Into<SharedVertices>, options: &DrawOptions) -> Self {
        let vertices: SharedVertices = vertices.into();
        // Degenerate fan: one face [0, i, i] per vertex
        let faces = (0..vertices.len() as u32).map(|i| [0, i, i]).collect();

        LineGroup {
            line: Line {
                name: options.name.clone(),
                vertices: Arc::clone(&vertices),
                material: LineMaterial {
                    color: options.color,
                },
                transform: Transform::default(),
            },
            hit_mesh: Mesh {
                vertices,
                faces,
                material: MeshMaterial::invisible(),
                transform: Transform::default(),
            },
            transform: Transform::default(),
        }
    }
}

/// A single point sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsObject {
    pub name: String,
    pub position: Point3<f64>,
    pub material: PointsMaterial,
    pub transform: Transform,
}

impl PointsObject {
    pub fn new(position: Point3<f64>, options: &DrawOptions) -> Self {
        PointsObject {
            name: options.name.clone(),
            position,
            material: PointsMaterial {
                color: options.color,
                size: options.size,
            },
            transform: Transform::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Points(PointsObject),
    LineGroup(LineGroup),
}

impl SceneObject {
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Points(points) => &points.name,
            SceneObject::LineGroup(group) => &group.line.name,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            SceneObject::Points(_) => 1,
            SceneObject::LineGroup(group) => group.line.vertices.len(),
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            SceneObject::Points(points) => &mut points.transform,
            SceneObject::LineGroup(group) => &mut group.transform,
        }
    }
}

/// Anything primitives can be added to.
pub trait Scene {
    fn add(&mut self, object: SceneObject);
}

impl Scene for Vec<SceneObject> {
    fn add(&mut self, object: SceneObject) {
        self.push(object);
    }
}

impl<S: Scene + ?Sized> Scene for &mut S {
    fn add(&mut self, object: SceneObject) {
        (**self).add(object);
    }
}

/// Owned, ordered scene with name based lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object carrying `name`.
    pub fn get_object_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name() == name)
    }

    pub fn objects_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SceneObject> + 'a {
        self.objects.iter().filter(move |object| object.name() == name)
    }

    /// Drop every object carrying `name`, returning how many went away.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.objects.len();
        self.objects.retain(|object| object.name() != name);
        before - self.objects.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl Scene for SceneGraph {
    fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> DrawOptions {
        DrawOptions {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_line_group_shares_vertices_with_hit_mesh() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let group = LineGroup::new(vertices.clone(), &named("graticule"));

        assert!(Arc::ptr_eq(&group.line.vertices, &group.hit_mesh.vertices));
        assert_eq!(&*group.line.vertices, vertices.as_slice());
        assert_eq!(group.hit_mesh.faces, vec![[0, 0, 0], [0, 1, 1], [0, 2, 2]]);
        assert_eq!(group.hit_mesh.material.opacity, 0.0);
        assert!(group.hit_mesh.material.transparent);
        assert!(group.hit_mesh.material.double_sided);
        assert_eq!(group.line.name, "graticule");
        assert_eq!(group.line.material.color, Color::RED);
    }

    #[test]
    fn test_scene_graph_lookup_and_removal() {
        let mut graph = SceneGraph::new();
        graph.add(SceneObject::Points(PointsObject::new(Point3::origin(), &named("city"))));
        graph.add(SceneObject::LineGroup(LineGroup::new(vec![Point3::origin()], &named("continent"))));
        graph.add(SceneObject::LineGroup(LineGroup::new(vec![Point3::origin()], &named("continent"))));

        assert_eq!(graph.len(), 3);
        assert!(matches!(
            graph.get_object_by_name("continent"),
            Some(SceneObject::LineGroup(_))
        ));
        assert_eq!(graph.objects_named("continent").count(), 2);
        assert!(graph.get_object_by_name("ocean").is_none());

        assert_eq!(graph.remove_named("continent"), 2);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.remove_named("continent"), 0);

        graph.clear();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_transforms_default_to_identity() {
        let mut object = SceneObject::Points(PointsObject::new(Point3::new(1.0, 2.0, 3.0), &named("")));
        let transform = object.transform_mut();
        assert_eq!(transform.scale, Vector3::new(1.0, 1.0, 1.0));
        transform.rotation.y = std::f64::consts::FRAC_PI_2;
        assert_eq!(object.vertex_count(), 1);
    }

    #[test]
    fn test_vec_and_mut_ref_are_scenes() {
        fn add_one<S: Scene>(mut scene: S) {
            scene.add(SceneObject::Points(PointsObject::new(Point3::origin(), &named("a"))));
        }

        let mut objects: Vec<SceneObject> = Vec::new();
        add_one(&mut objects);
        add_one(&mut objects);
        assert_eq!(objects.len(), 2);
    }
}

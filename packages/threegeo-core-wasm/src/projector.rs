// Projects GeoJSON documents onto a sphere or a plane and adds the resulting
// line and point primitives to a scene.
use nalgebra::Point3;
use serde_json::Value;

use crate::console_log;
use crate::coordinates::Conversion;
use crate::error::ProjectionError;
use crate::geojson_features::{geometry_entries, Geometry, GeometryEntry, Position};
use crate::interpolate::interpolate_positions;
use crate::models::{DrawOptions, DrawSummary, Shape};
use crate::scene::{LineGroup, PointsObject, Scene, SceneObject};

/// Draws GeoJSON into the scene it was constructed with.
///
/// Converted vertices of the line being drawn go through one scratch buffer
/// whose capacity is kept across lines and calls. Each line copies the
/// buffer into its shared vertex list once. The buffer is empty whenever
/// `draw` returns, whether it succeeded or not.
pub struct GeoProjector<S: Scene> {
    scene: S,
    scratch: Vec<Point3<f64>>,
}

impl<S: Scene> GeoProjector<S> {
    pub fn new(scene: S) -> Self {
        GeoProjector {
            scene,
            scratch: Vec::new(),
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn into_scene(self) -> S {
        self.scene
    }

    /// Number of vertices currently held in the scratch buffer.
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    /// Parse `json` and draw it. See [`GeoProjector::draw`].
    pub fn draw_str(
        &mut self,
        json: &str,
        radius: Option<f64>,
        shape: &str,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| ProjectionError::MalformedDocument(e.to_string()))?;
        self.draw(&document, radius, shape, options)
    }

    /// Draw `document` onto a `"sphere"` of `radius` or onto a `"plane"` sized
    /// by `options.width` / `options.height`.
    ///
    /// Stops at the first geometry with an unknown type. Primitives emitted
    /// for earlier geometries stay in the scene.
    pub fn draw(
        &mut self,
        document: &Value,
        radius: Option<f64>,
        shape: &str,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError> {
        self.draw_document(document, radius, || shape.parse(), options)
    }

    /// Same as [`GeoProjector::draw`] with an already parsed shape.
    pub fn draw_shape(
        &mut self,
        document: &Value,
        radius: Option<f64>,
        shape: Shape,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError> {
        self.draw_document(document, radius, || Ok(shape), options)
    }

    // The document type is validated before the shape
    fn draw_document<F>(
        &mut self,
        document: &Value,
        radius: Option<f64>,
        shape: F,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError>
    where
        F: FnOnce() -> Result<Shape, ProjectionError>,
    {
        let result = geometry_entries(document).and_then(|entries| {
            let shape = shape()?;
            self.draw_entries(entries, radius, shape, options)
        });
        self.scratch.clear();
        result
    }

    fn draw_entries(
        &mut self,
        entries: Vec<GeometryEntry<'_>>,
        radius: Option<f64>,
        shape: Shape,
        options: &DrawOptions,
    ) -> Result<DrawSummary, ProjectionError> {
        let conversion = Conversion::new(shape, radius, options);
        let mut summary = DrawSummary::default();

        console_log!(
            "Projecting {} geometries onto {:?} (name: '{}')",
            entries.len(),
            shape,
            options.name
        );

        for entry in entries {
            if shape == Shape::Plane && options.excludes_on_plane(entry.feature_id.as_deref()) {
                continue;
            }

            let geometry = Geometry::from_value(entry.geometry)?;
            self.draw_geometry(&geometry, &conversion, options, &mut summary);
            summary.geometries += 1;
        }

        console_log!(
            "Projection done: {} lines, {} points, {} vertices",
            summary.lines,
            summary.points,
            summary.vertices
        );

        Ok(summary)
    }

    fn draw_geometry(
        &mut self,
        geometry: &Geometry,
        conversion: &Conversion,
        options: &DrawOptions,
        summary: &mut DrawSummary,
    ) {
        match geometry {
            Geometry::Point(position) => self.draw_point(*position, conversion, options, summary),
            Geometry::MultiPoint(positions) => {
                for position in positions {
                    self.draw_point(*position, conversion, options, summary);
                }
            }
            Geometry::LineString(positions) => {
                self.draw_line(positions, conversion, options, summary)
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                for line in lines {
                    self.draw_line(line, conversion, options, summary);
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    self.draw_line(ring, conversion, options, summary);
                }
            }
        }
    }

    fn draw_point(
        &mut self,
        position: Position,
        conversion: &Conversion,
        options: &DrawOptions,
        summary: &mut DrawSummary,
    ) {
        let point = PointsObject::new(conversion.convert(position), options);
        self.scene.add(SceneObject::Points(point));
        summary.points += 1;
        summary.vertices += 1;
    }

    fn draw_line(
        &mut self,
        positions: &[Position],
        conversion: &Conversion,
        options: &DrawOptions,
        summary: &mut DrawSummary,
    ) {
        let dense = interpolate_positions(positions);
        self.scratch
            .extend(dense.into_iter().map(|position| conversion.convert(position)));

        let group = LineGroup::new(self.scratch.as_slice(), options);
        summary.lines += 1;
        summary.vertices += self.scratch.len();
        self.scratch.clear();

        self.scene.add(SceneObject::LineGroup(group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn plane_options(width: f64, height: f64) -> DrawOptions {
        DrawOptions {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    fn line_vertices(object: &SceneObject) -> Vec<Point3<f64>> {
        match object {
            SceneObject::LineGroup(group) => group.line.vertices.to_vec(),
            other => panic!("expected a line group, got {:?}", other),
        }
    }

    #[test]
    fn test_point_on_sphere() {
        let mut projector = GeoProjector::new(SceneGraph::new());
        let summary = projector
            .draw(&json!({"type": "Point", "coordinates": [0, 0]}), Some(200.0), "sphere", &DrawOptions::default())
            .unwrap();

        assert_eq!(summary.points, 1);
        let scene = projector.into_scene();
        assert_eq!(scene.len(), 1);
        match &scene.objects()[0] {
            SceneObject::Points(points) => {
                assert_relative_eq!(points.position, Point3::new(200.0, 0.0, 0.0), epsilon = 1e-9);
                assert_eq!(points.material.size, 1.0);
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_antimeridian_line_is_interpolated_through_zero() {
        let doc = json!({"type": "LineString", "coordinates": [[-170, 0], [170, 0]]});
        let mut projector = GeoProjector::new(SceneGraph::new());
        projector.draw(&doc, None, "plane", &plane_options(720.0, 360.0)).unwrap();

        let vertices = line_vertices(&projector.scene().objects()[0]);
        assert_eq!(vertices.len(), 129);
        for pair in vertices.windows(2) {
            assert!((pair[1].x - pair[0].x).abs() <= 5.0);
            assert!((pair[1].y - pair[0].y).abs() <= 5.0);
        }
        assert!(vertices.iter().any(|v| v.x == 0.0));
        assert!(vertices.iter().all(|v| v.x >= -170.0 && v.x <= 170.0));
    }

    #[test]
    #[ignore = "antimeridian crossings are still bisected the long way round"]
    fn test_antimeridian_line_takes_the_short_way() {
        let doc = json!({"type": "LineString", "coordinates": [[170, 0], [-170, 0]]});
        let mut projector = GeoProjector::new(SceneGraph::new());
        projector.draw(&doc, None, "plane", &plane_options(720.0, 360.0)).unwrap();

        let vertices = line_vertices(&projector.scene().objects()[0]);
        assert!(vertices.iter().all(|v| v.x.abs() >= 170.0));
    }

    #[test]
    fn test_polygon_on_plane_maps_to_degrees() {
        let ring = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]];
        let doc = json!({"type": "Polygon", "coordinates": [ring]});
        let mut projector = GeoProjector::new(SceneGraph::new());
        let summary = projector.draw(&doc, None, "plane", &plane_options(720.0, 360.0)).unwrap();
        assert_eq!(summary.lines, 1);

        let vertices = line_vertices(&projector.scene().objects()[0]);
        // 10 degree edges get one midpoint each
        let expected: Vec<Point3<f64>> = [
            [0.0, 0.0], [5.0, 0.0], [10.0, 0.0], [10.0, 5.0], [10.0, 10.0],
            [5.0, 10.0], [0.0, 10.0], [0.0, 5.0], [0.0, 0.0],
        ]
        .iter()
        .map(|[x, y]| Point3::new(*x, *y, 0.0))
        .collect();
        assert_eq!(vertices, expected);
        for corner in ring {
            assert!(vertices.contains(&Point3::new(corner[0], corner[1], 0.0)));
        }
    }

    #[test]
    fn test_invalid_shape_leaves_scratch_empty() {
        let mut projector = GeoProjector::new(SceneGraph::new());
        let err = projector
            .draw(&json!({"type": "Point", "coordinates": [0, 0]}), Some(200.0), "cube", &DrawOptions::default())
            .unwrap_err();

        assert_eq!(err, ProjectionError::InvalidShape("cube".to_string()));
        assert_eq!(projector.scratch_len(), 0);
        assert!(projector.scene().is_empty());
    }

    #[test]
    fn test_document_type_is_checked_before_shape() {
        let mut projector = GeoProjector::new(SceneGraph::new());
        let err = projector
            .draw(&json!({"type": "Topology"}), Some(200.0), "cube", &DrawOptions::default())
            .unwrap_err();
        assert_eq!(err, ProjectionError::InvalidDocumentType("Topology".to_string()));
    }

    #[test]
    fn test_draw_shape_on_plane_stops_at_invalid_geometry() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [4, 4]]}},
                {"type": "Feature", "geometry": {"type": "Curve", "coordinates": []}}
            ]
        });
        let mut projector = GeoProjector::new(SceneGraph::new());
        let err = projector
            .draw_shape(&doc, None, Shape::Plane, &plane_options(720.0, 360.0))
            .unwrap_err();

        assert_eq!(err, ProjectionError::InvalidGeometryType("Curve".to_string()));
        assert_eq!(projector.scratch_len(), 0);
        assert_eq!(
            line_vertices(&projector.scene().objects()[0]),
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 0.0)]
        );
    }

    #[test]
    fn test_lines_keep_their_vertices_after_scratch_reuse() {
        let mut projector = GeoProjector::new(SceneGraph::new());
        let options = plane_options(720.0, 360.0);
        projector
            .draw_shape(&json!({"type": "LineString", "coordinates": [[1, 1], [2, 2]]}), None, Shape::Plane, &options)
            .unwrap();
        projector
            .draw_shape(&json!({"type": "LineString", "coordinates": [[-3, -3], [-4, -4], [-5, -5]]}), None, Shape::Plane, &options)
            .unwrap();

        let objects = projector.scene().objects();
        assert_eq!(
            line_vertices(&objects[0]),
            vec![Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 2.0, 0.0)]
        );
        assert_eq!(line_vertices(&objects[1]).len(), 3);
        assert_eq!(projector.scratch_len(), 0);
    }

    #[test]
    fn test_invalid_geometry_aborts_but_keeps_earlier_primitives() {
        let doc = json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "LineString", "coordinates": [[0, 0], [30, 0]]},
                {"type": "Circle", "coordinates": [0, 0]},
                {"type": "Point", "coordinates": [1, 1]}
            ]
        });
        let mut projector = GeoProjector::new(SceneGraph::new());
        let err = projector.draw(&doc, Some(100.0), "sphere", &DrawOptions::default()).unwrap_err();

        assert_eq!(err, ProjectionError::InvalidGeometryType("Circle".to_string()));
        assert_eq!(projector.scene().len(), 1);
        assert_eq!(projector.scratch_len(), 0);

        // The projector stays usable afterwards
        projector
            .draw(&json!({"type": "Point", "coordinates": [1, 1]}), Some(100.0), "sphere", &DrawOptions::default())
            .unwrap();
        assert_eq!(projector.scene().len(), 2);
        assert_eq!(projector.scratch_len(), 0);
    }

    #[test]
    fn test_identical_draws_are_identical() {
        let doc = json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiLineString",
                "coordinates": [[[-40, -20], [60, 45]], [[100, 80], [-100, -80]]]
            }
        });
        let options = DrawOptions {
            name: "graticule".to_string(),
            ..Default::default()
        };

        let mut first = GeoProjector::new(SceneGraph::new());
        let mut second = GeoProjector::new(SceneGraph::new());
        let a = first.draw(&doc, Some(200.0), "sphere", &options).unwrap();
        let b = second.draw(&doc, Some(200.0), "sphere", &options).unwrap();

        assert_eq!(a, b);
        assert_eq!(first.scene(), second.scene());
    }

    #[test]
    fn test_redraw_with_same_name_duplicates() {
        let doc = json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]});
        let options = DrawOptions {
            name: "continent".to_string(),
            ..Default::default()
        };
        let mut projector = GeoProjector::new(SceneGraph::new());
        projector.draw(&doc, Some(1.0), "sphere", &options).unwrap();
        projector.draw(&doc, Some(1.0), "sphere", &options).unwrap();
        assert_eq!(projector.scene().objects_named("continent").count(), 2);

        assert_eq!(projector.scene_mut().remove_named("continent"), 2);
        projector.draw(&doc, Some(1.0), "sphere", &options).unwrap();
        assert_eq!(projector.scene().objects_named("continent").count(), 1);
    }

    #[test]
    fn test_multi_geometries_emit_one_primitive_per_part() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "MultiPoint", "coordinates": [[0, 0], [10, 10], [20, 20]]}},
                {"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]], [[0.2, 0.2], [0.4, 0.2], [0.2, 0.4], [0.2, 0.2]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 5]]]
                ]}}
            ]
        });
        let mut projector = GeoProjector::new(SceneGraph::new());
        let summary = projector.draw(&doc, Some(10.0), "sphere", &DrawOptions::default()).unwrap();

        assert_eq!(summary.geometries, 2);
        assert_eq!(summary.points, 3);
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.vertices, 3 + 12);
        assert_eq!(projector.scene().len(), 6);
    }

    #[test]
    fn test_plane_excludes_configured_features() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "antarctica", "geometry": {"type": "LineString", "coordinates": [[0, -80], [1, -80]]}},
                {"type": "Feature", "id": "europe", "geometry": {"type": "LineString", "coordinates": [[0, 50], [1, 50]]}}
            ]
        });
        let options = DrawOptions {
            plane_excluded_ids: vec!["antarctica".to_string()],
            ..plane_options(720.0, 360.0)
        };

        let mut plane = GeoProjector::new(SceneGraph::new());
        assert_eq!(plane.draw(&doc, None, "plane", &options).unwrap().lines, 1);

        // The exclusion list only applies on the plane
        let mut globe = GeoProjector::new(SceneGraph::new());
        assert_eq!(globe.draw(&doc, Some(200.0), "sphere", &options).unwrap().lines, 2);
    }

    #[test]
    fn test_draw_str_rejects_bad_json() {
        let mut projector = GeoProjector::new(Vec::<SceneObject>::new());
        let err = projector
            .draw_str("{not json", Some(1.0), "sphere", &DrawOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProjectionError::MalformedDocument(_)));

        let summary = projector
            .draw_str(r#"{"type": "Point", "coordinates": [90, 0]}"#, Some(1.0), "sphere", &DrawOptions::default())
            .unwrap();
        assert_eq!(summary.points, 1);
        assert_eq!(projector.scene().len(), 1);
    }

    #[test]
    fn test_draw_into_borrowed_scene() {
        let mut graph = SceneGraph::new();
        {
            let mut projector = GeoProjector::new(&mut graph);
            projector
                .draw(&json!({"type": "Point", "coordinates": [0, 0]}), Some(1.0), "sphere", &DrawOptions::default())
                .unwrap();
        }
        assert_eq!(graph.len(), 1);
    }
}

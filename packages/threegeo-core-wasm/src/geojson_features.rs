// Typed view over the GeoJSON subset the projector understands.
//
// Documents are walked as `serde_json::Value` so that each geometry is only
// typed when it is about to be drawn: an unknown geometry type aborts the draw
// at that geometry, after the earlier ones have been emitted.
use geo_types::Coord;
use serde_json::Value;

use crate::error::ProjectionError;

/// A `[longitude, latitude]` pair in decimal degrees (`x` = lon, `y` = lat).
pub type Position = Coord<f64>;

/// The six drawable GeoJSON geometry kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

/// A geometry pulled out of a document, with the id of its feature if any.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEntry<'a> {
    pub feature_id: Option<String>,
    pub geometry: &'a Value,
}

const GEOMETRY_TYPES: [&str; 6] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
];

fn type_name(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn member_array<'a>(value: &'a Value, member: &str) -> Result<&'a Vec<Value>, ProjectionError> {
    value
        .get(member)
        .and_then(Value::as_array)
        .ok_or_else(|| ProjectionError::MalformedDocument(format!("'{}' must be an array", member)))
}

fn feature_id(feature: &Value) -> Option<String> {
    match feature.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}

// Unlocated features (null or absent geometry) contribute nothing
fn push_feature<'a>(feature: &'a Value, entries: &mut Vec<GeometryEntry<'a>>) {
    match feature.get("geometry") {
        Some(geometry) if !geometry.is_null() => entries.push(GeometryEntry {
            feature_id: feature_id(feature),
            geometry,
        }),
        _ => {}
    }
}

/// Flatten a document into the list of geometries to draw, in document order.
pub fn geometry_entries(document: &Value) -> Result<Vec<GeometryEntry<'_>>, ProjectionError> {
    let mut entries = Vec::new();

    match type_name(document) {
        Some("Feature") => push_feature(document, &mut entries),
        Some("FeatureCollection") => {
            for feature in member_array(document, "features")? {
                push_feature(feature, &mut entries);
            }
        }
        Some("GeometryCollection") => {
            for geometry in member_array(document, "geometries")? {
                entries.push(GeometryEntry {
                    feature_id: None,
                    geometry,
                });
            }
        }
        // A bare geometry is a valid GeoJSON root as well
        Some(kind) if GEOMETRY_TYPES.contains(&kind) => entries.push(GeometryEntry {
            feature_id: None,
            geometry: document,
        }),
        Some(kind) => return Err(ProjectionError::InvalidDocumentType(kind.to_string())),
        None => return Err(ProjectionError::InvalidDocumentType("<missing>".to_string())),
    }

    Ok(entries)
}

// Non-numeric or missing ordinates become NaN, extra ordinates (altitude) are ignored
fn parse_position(value: &Value) -> Position {
    let ordinate = |index: usize| {
        value
            .get(index)
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN)
    };
    Coord {
        x: ordinate(0),
        y: ordinate(1),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<Position>, ProjectionError> {
    let items = value.as_array().ok_or_else(|| {
        ProjectionError::MalformedDocument("expected an array of positions".to_string())
    })?;
    Ok(items.iter().map(parse_position).collect())
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<Position>>, ProjectionError> {
    let items = value.as_array().ok_or_else(|| {
        ProjectionError::MalformedDocument("expected an array of rings".to_string())
    })?;
    items.iter().map(parse_positions).collect()
}

impl Geometry {
    /// Type a single geometry object.
    pub fn from_value(value: &Value) -> Result<Self, ProjectionError> {
        let kind = type_name(value).unwrap_or("<missing>");
        if !GEOMETRY_TYPES.contains(&kind) {
            return Err(ProjectionError::InvalidGeometryType(kind.to_string()));
        }

        let coordinates = value.get("coordinates").ok_or_else(|| {
            ProjectionError::MalformedDocument(format!("{} without coordinates", kind))
        })?;

        let geometry = match kind {
            "Point" => Geometry::Point(parse_position(coordinates)),
            "MultiPoint" => Geometry::MultiPoint(parse_positions(coordinates)?),
            "LineString" => Geometry::LineString(parse_positions(coordinates)?),
            "MultiLineString" => Geometry::MultiLineString(parse_rings(coordinates)?),
            "Polygon" => Geometry::Polygon(parse_rings(coordinates)?),
            _ => {
                let polygons = coordinates.as_array().ok_or_else(|| {
                    ProjectionError::MalformedDocument("expected an array of polygons".to_string())
                })?;
                Geometry::MultiPolygon(polygons.iter().map(parse_rings).collect::<Result<_, _>>()?)
            }
        };

        Ok(geometry)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

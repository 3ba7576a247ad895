// Geographic to render-space coordinate conversion
use nalgebra::Point3;

use crate::geojson_features::Position;
use crate::models::{DrawOptions, Frame, Shape};

/// Map a position onto a sphere of `radius`, north pole on +z.
pub fn sphere_coords(position: Position, radius: f64) -> Point3<f64> {
    let lon = position.x.to_radians();
    let lat = position.y.to_radians();

    Point3::new(
        lat.cos() * lon.cos() * radius,
        lat.cos() * lon.sin() * radius,
        lat.sin() * radius,
    )
}

/// Equirectangular mapping centred on (0, 0).
pub fn plane_coords(position: Position, width: f64, height: f64) -> Point3<f64> {
    Point3::new(
        position.x * (width / 2.0 / 360.0),
        position.y * (height / 2.0 / 180.0),
        0.0,
    )
}

/// The conversion selected for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    Sphere { radius: f64, frame: Frame },
    Plane { width: f64, height: f64 },
}

impl Conversion {
    // A missing radius in sphere mode gives NaN vertices, same as missing plane dimensions
    pub fn new(shape: Shape, radius: Option<f64>, options: &DrawOptions) -> Self {
        match shape {
            Shape::Sphere => Conversion::Sphere {
                radius: radius.unwrap_or(f64::NAN),
                frame: options.frame,
            },
            Shape::Plane => {
                let (width, height) = options.plane_dimensions();
                Conversion::Plane { width, height }
            }
        }
    }

    pub fn convert(&self, position: Position) -> Point3<f64> {
        match *self {
            Conversion::Sphere { radius, frame } => {
                let p = sphere_coords(position, radius);
                match frame {
                    Frame::Geographic => p,
                    Frame::YUp => Point3::new(p.y, p.z, p.x),
                }
            }
            Conversion::Plane { width, height } => plane_coords(position, width, height),
        }
    }
}

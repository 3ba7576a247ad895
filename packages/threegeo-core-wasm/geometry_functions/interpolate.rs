use geo_types::Coord;

use crate::geojson_features::Position;

/// Largest allowed step, in degrees on either axis, between consecutive points.
pub const MAX_SEGMENT_DEGREES: f64 = 5.0;

// Widest spans a valid pair of positions can have
const MAX_LONGITUDE_SPAN: f64 = 360.0;
const MAX_LATITUDE_SPAN: f64 = 180.0;

/// Whether the segment between two positions has to be split.
///
/// Longitudes are compared by plain subtraction, so a segment crossing the
/// antimeridian (e.g. 170 -> -170) is treated as 340 degrees long and gets
/// bisected the long way round through 0. Segments with a non-finite ordinate,
/// or spanning more than a whole turn of longitude or pole to pole of
/// latitude, are never split.
pub fn needs_interpolation(a: Position, b: Position) -> bool {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return false;
    }
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx > MAX_LONGITUDE_SPAN || dy > MAX_LATITUDE_SPAN {
        return false;
    }
    dx > MAX_SEGMENT_DEGREES || dy > MAX_SEGMENT_DEGREES
}

pub fn midpoint(a: Position, b: Position) -> Position {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

// Append everything after `a` up to and including `b`
fn bisect_into(a: Position, b: Position, out: &mut Vec<Position>) {
    if needs_interpolation(a, b) {
        let mid = midpoint(a, b);
        bisect_into(a, mid, out);
        bisect_into(mid, b, out);
    } else {
        out.push(b);
    }
}

/// Densify a line string or ring so no step exceeds [`MAX_SEGMENT_DEGREES`].
///
/// Input points are kept in order; midpoints are inserted between any pair
/// that is too far apart, recursively on both halves.
pub fn interpolate_positions(positions: &[Position]) -> Vec<Position> {
    let mut out = Vec::with_capacity(positions.len());
    let mut iter = positions.iter().copied();

    if let Some(first) = iter.next() {
        out.push(first);
        let mut previous = first;
        for current in iter {
            bisect_into(previous, current, &mut out);
            previous = current;
        }
    }

    out
}

//! Conversion of ring coordinate buffers into planar polygons.

use geo_types::{Coord, LineString, Polygon};
use kerbside_gml::RingBuffer;

use crate::error::KerbsideError;

/// Builds a polygon from a ring buffer.
///
/// The buffer is split into `x, y, z` triples in their original order and the `z` coordinate is
/// dropped. The resulting points become the exterior of the polygon. The ring is expected to be
/// closed; if it is not, the polygon closes it by repeating the first point. Validity of the
/// polygon (self-intersections, orientation) is not checked.
///
/// Returns [`KerbsideError::InvalidGeometry`] if the buffer length is not a multiple of 3.
pub fn reconstruct(ring: &RingBuffer) -> Result<Polygon<f64>, KerbsideError> {
    let values = ring.values();
    if values.len() % 3 != 0 {
        return Err(KerbsideError::InvalidGeometry(format!(
            "ring buffer of {} values cannot be split into 3D points",
            values.len()
        )));
    }

    let exterior: LineString<f64> = values
        .chunks_exact(3)
        .map(|point| Coord {
            x: point[0],
            y: point[1],
        })
        .collect();

    Ok(Polygon::new(exterior, vec![]))
}

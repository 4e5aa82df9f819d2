use std::collections::BTreeMap;

use geo::Intersects;
use geo_types::{Coord, LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Coordinates of one linear ring as read from the document, flattened in `x, y, z` order.
///
/// The buffer is always three-dimensional: rings stored with `srsDimension="2"` are widened with
/// `z = 0.0` by the reader. Nothing guarantees that the length is a multiple of three when a
/// buffer is constructed by hand, so consumers must check it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RingBuffer(pub Vec<f64>);

impl RingBuffer {
    /// Creates a buffer from flat `x, y, z` values.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Creates a buffer from a list of points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self(points.iter().flatten().copied().collect())
    }

    /// Flat coordinate values.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of coordinate values (not points) in the buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the buffer has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self
            .0
            .chunks_exact(3)
            .map(|point| Coord {
                x: point[0],
                y: point[1],
            })
            .collect();
        Polygon::new(exterior, vec![])
    }

    fn extend_envelope(&self, envelope: &mut Option<[f64; 4]>) {
        for point in self.0.chunks_exact(3) {
            let (x, y) = (point[0], point[1]);
            *envelope = Some(match *envelope {
                None => [x, y, x, y],
                Some([x_min, y_min, x_max, y_max]) => {
                    [x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y)]
                }
            });
        }
    }
}

/// One city object read from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Value of the `gml:id` attribute of the object element.
    pub gml_id: Option<String>,
    /// Value of the `name` property.
    pub name: Option<String>,
    /// Value of the `function` property, exactly as written in the document.
    pub function: Option<String>,
    /// Other simple properties keyed by their local name. Nested properties are keyed by the path
    /// of local names joined with `|`, e.g. `externalReference|informationSystem`.
    pub attributes: BTreeMap<String, String>,
    /// Exterior rings of all the surfaces of the object, in document order.
    pub geometry: Vec<RingBuffer>,
}

impl FeatureRow {
    /// Two dimensional envelope of all the rings of the row, or `None` if the row has no points.
    pub fn envelope(&self) -> Option<Rect<f64>> {
        let mut envelope = None;
        for ring in &self.geometry {
            ring.extend_envelope(&mut envelope);
        }

        envelope.map(|[x_min, y_min, x_max, y_max]| Rect::new((x_min, y_min), (x_max, y_max)))
    }

    /// Returns true if any ring of the row touches or overlaps `bbox`.
    ///
    /// Rings are compared as planar polygons, so a ring whose envelope covers `bbox` but whose
    /// area does not reach it does not intersect.
    pub fn intersects(&self, bbox: &Rect<f64>) -> bool {
        let Some(envelope) = self.envelope() else {
            return false;
        };

        envelope.intersects(bbox)
            && self
                .geometry
                .iter()
                .any(|ring| ring.to_polygon().intersects(bbox))
    }
}

/// Ordered set of rows read from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Creates a table from the given rows.
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at the given index.
    pub fn get(&self, index: usize) -> Option<&FeatureRow> {
        self.rows.get(index)
    }

    /// All rows in document order.
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// The `name` column.
    pub fn names(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(|row| row.name.as_deref())
    }

    /// The `function` column.
    pub fn functions(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(|row| row.function.as_deref())
    }

    pub(crate) fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }
}

use geo_types::Polygon;
use kerbside_gml::FeatureTable;

use crate::category::FeatureCategory;
use crate::error::KerbsideError;
use crate::ring;

/// City object extracted from a feature table.
///
/// Entity owns its polygons and keeps no reference to the table it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEntity {
    name: String,
    category: FeatureCategory,
    polygons: Vec<Polygon<f64>>,
}

impl FeatureEntity {
    /// Creates an entity from the row `index` of the `table`.
    ///
    /// Every ring buffer of the row is converted into one polygon, so the entity has as many
    /// polygons as the row has rings, in the same order.
    pub fn from_table(
        category: FeatureCategory,
        table: &FeatureTable,
        index: usize,
    ) -> Result<Self, KerbsideError> {
        let row = table.get(index).ok_or(KerbsideError::IndexOutOfRange {
            index,
            len: table.len(),
        })?;

        let polygons = row
            .geometry
            .iter()
            .map(ring::reconstruct)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: row.name.clone().unwrap_or_default(),
            category,
            polygons,
        })
    }

    /// Name of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category the object was loaded as.
    pub fn category(&self) -> FeatureCategory {
        self.category
    }

    /// Polygons of the object.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Consumes the entity returning its polygons.
    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        self.polygons
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use kerbside_gml::{FeatureRow, RingBuffer};

    use super::*;

    fn triangle(offset: f64) -> RingBuffer {
        RingBuffer::from_points(&[
            [offset, 0.0, 1.0],
            [offset + 1.0, 0.0, 1.0],
            [offset, 1.0, 1.0],
            [offset, 0.0, 1.0],
        ])
    }

    fn table() -> FeatureTable {
        FeatureTable::new(vec![
            FeatureRow {
                name: Some("Main street".into()),
                function: Some("1".into()),
                geometry: vec![triangle(0.0), triangle(5.0)],
                ..Default::default()
            },
            FeatureRow {
                name: None,
                geometry: vec![triangle(10.0)],
                ..Default::default()
            },
            FeatureRow {
                name: Some("Broken".into()),
                geometry: vec![RingBuffer::new(vec![0.0, 1.0])],
                ..Default::default()
            },
        ])
    }

    #[test]
    fn one_polygon_per_ring() {
        let entity = FeatureEntity::from_table(FeatureCategory::Road, &table(), 0).unwrap();

        assert_eq!(entity.name(), "Main street");
        assert_eq!(entity.category(), FeatureCategory::Road);
        assert_eq!(entity.polygon_count(), 2);
        assert_eq!(entity.polygons()[1].exterior().0[0].x, 5.0);
    }

    #[test]
    fn missing_name_is_empty() {
        let entity = FeatureEntity::from_table(FeatureCategory::TrafficSign, &table(), 1).unwrap();
        assert_eq!(entity.name(), "");
        assert_eq!(entity.into_polygons().len(), 1);
    }

    #[test]
    fn index_out_of_range() {
        assert_matches!(
            FeatureEntity::from_table(FeatureCategory::Road, &table(), 3),
            Err(KerbsideError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn invalid_ring() {
        assert_matches!(
            FeatureEntity::from_table(FeatureCategory::Road, &table(), 2),
            Err(KerbsideError::InvalidGeometry(_))
        );
    }
}

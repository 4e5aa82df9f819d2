//! Region of interest.

use std::path::Path;

use geo::{BoundingRect, Intersects};
use geo_types::{Geometry, MultiPolygon, Polygon, Rect};
use geojson::GeoJson;

use crate::error::KerbsideError;

/// Area of interest used to limit the loaded features.
///
/// The filter is immutable once loaded. Feature readers receive its bounding rectangle, so the
/// objects are selected by their envelopes intersecting the envelope of the region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFilter {
    geometry: MultiPolygon<f64>,
    bounds: Rect<f64>,
}

impl RegionFilter {
    /// Creates a filter from polygons. Returns an error if the geometry has no points.
    pub fn new(geometry: MultiPolygon<f64>) -> Result<Self, KerbsideError> {
        let bounds = geometry
            .bounding_rect()
            .ok_or_else(|| KerbsideError::InvalidRegion("region geometry is empty".into()))?;
        Ok(Self { geometry, bounds })
    }

    /// Reads the region from a GeoJSON file.
    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self, KerbsideError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let region = Self::from_geojson_str(&json)?;
        log::debug!(
            "Loaded region of {} polygons from {}",
            region.geometry.0.len(),
            path.display()
        );

        Ok(region)
    }

    /// Parses a GeoJSON document.
    ///
    /// The document can be a feature collection, a single feature or a bare geometry. All polygons
    /// and multipolygons in it are merged into one region; other geometry types are skipped.
    pub fn from_geojson_str(json: &str) -> Result<Self, KerbsideError> {
        let geojson = json
            .parse::<GeoJson>()
            .map_err(|err| KerbsideError::InvalidRegion(err.to_string()))?;

        let geometries = match geojson {
            GeoJson::Geometry(geometry) => vec![geometry],
            GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .collect(),
        };

        let mut polygons = vec![];
        for geometry in geometries {
            let geometry = Geometry::<f64>::try_from(geometry)
                .map_err(|err| KerbsideError::InvalidRegion(err.to_string()))?;
            collect_polygons(geometry, &mut polygons);
        }

        if polygons.is_empty() {
            return Err(KerbsideError::InvalidRegion(
                "document does not contain any polygons".into(),
            ));
        }

        Self::new(MultiPolygon::new(polygons))
    }

    /// Polygons of the region.
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Bounding rectangle of the region.
    pub fn bounding_rect(&self) -> Rect<f64> {
        self.bounds
    }

    /// Returns true if the bounding rectangle of the region intersects `rect`.
    pub fn intersects_rect(&self, rect: &Rect<f64>) -> bool {
        self.bounds.intersects(rect)
    }
}

fn collect_polygons(geometry: Geometry<f64>, polygons: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(polygon) => polygons.push(polygon),
        Geometry::MultiPolygon(multi_polygon) => polygons.extend(multi_polygon),
        Geometry::Rect(rect) => polygons.push(rect.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                collect_polygons(geometry, polygons);
            }
        }
        _ => log::warn!("Non-polygonal geometry in the region is ignored"),
    }
}

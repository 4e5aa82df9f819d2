use std::path::Path;

use geo_types::Polygon;
use kerbside_gml::GmlReader;

use crate::category::FeatureCategory;
use crate::entity::FeatureEntity;
use crate::error::KerbsideError;
use crate::factory::{FeatureFactory, SourceDirectories};
use crate::reader::FeatureReader;
use crate::region::RegionFilter;
use crate::render::{RenderOptions, Renderer};

/// Roads and traffic signs of a region.
///
/// The environment owns one factory per category and loads their objects clipped to the region
/// each time a `generate_*` method is called. Nothing is cached between calls.
///
/// ```no_run
/// use kerbside::{ImageRenderer, RegionEnvironment, RenderOptions, SourceDirectories};
///
/// let env = RegionEnvironment::from_geojson_file(
///     "area.geojson",
///     SourceDirectories::in_dir("/data/city"),
/// )?;
/// env.visualize(None, &mut ImageRenderer::new("area.png"), &RenderOptions::default())?;
/// # Ok::<(), kerbside::error::KerbsideError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RegionEnvironment<R = GmlReader> {
    region: RegionFilter,
    road_factory: FeatureFactory<R>,
    traffic_sign_factory: FeatureFactory<R>,
}

impl RegionEnvironment<GmlReader> {
    /// Creates an environment for the region, reading CityGML files from `directories`.
    pub fn new(region: RegionFilter, directories: SourceDirectories) -> Self {
        Self {
            region,
            road_factory: FeatureFactory::new(FeatureCategory::Road, directories.clone()),
            traffic_sign_factory: FeatureFactory::new(FeatureCategory::TrafficSign, directories),
        }
    }

    /// Reads the region from a GeoJSON file and creates the environment for it.
    pub fn from_geojson_file(
        path: impl AsRef<Path>,
        directories: SourceDirectories,
    ) -> Result<Self, KerbsideError> {
        Ok(Self::new(RegionFilter::from_geojson_file(path)?, directories))
    }
}

impl<R: FeatureReader> RegionEnvironment<R> {
    /// Replaces the feature reader of both factories.
    pub fn with_reader<T: FeatureReader + Clone>(self, reader: T) -> RegionEnvironment<T> {
        RegionEnvironment {
            region: self.region,
            road_factory: self.road_factory.with_reader(reader.clone()),
            traffic_sign_factory: self.traffic_sign_factory.with_reader(reader),
        }
    }

    /// Loads only roads with the given `function` code.
    pub fn with_road_filter(mut self, function: Option<i64>) -> Self {
        self.road_factory = self.road_factory.with_attribute_filter(function);
        self
    }

    /// Loads only traffic signs with the given `function` code.
    pub fn with_traffic_sign_filter(mut self, function: Option<i64>) -> Self {
        self.traffic_sign_factory = self.traffic_sign_factory.with_attribute_filter(function);
        self
    }

    /// Region of interest.
    pub fn region(&self) -> &RegionFilter {
        &self.region
    }

    /// Roads intersecting the region.
    pub fn generate_roads(&self) -> Result<Vec<FeatureEntity>, KerbsideError> {
        self.road_factory.get_city_objects(Some(&self.region))
    }

    /// Traffic signs intersecting the region.
    pub fn generate_traffic_signs(&self) -> Result<Vec<FeatureEntity>, KerbsideError> {
        self.traffic_sign_factory.get_city_objects(Some(&self.region))
    }

    /// All polygons of roads followed by all polygons of traffic signs.
    pub fn generate_all(&self) -> Result<Vec<Polygon<f64>>, KerbsideError> {
        let roads = self.generate_roads()?;
        let signs = self.generate_traffic_signs()?;

        Ok(roads
            .into_iter()
            .chain(signs)
            .flat_map(FeatureEntity::into_polygons)
            .collect())
    }

    /// Renders `items`, or everything in the region if `items` is empty or not given.
    ///
    /// Returns after the renderer finishes, which for interactive renderers means after the user
    /// closes the display.
    pub fn visualize(
        &self,
        items: Option<Vec<Polygon<f64>>>,
        renderer: &mut impl Renderer,
        options: &RenderOptions,
    ) -> Result<(), KerbsideError> {
        let items = match items {
            Some(items) if !items.is_empty() => items,
            _ => self.generate_all()?,
        };

        log::info!("Rendering {} polygons", items.len());
        renderer.render(&items, options)
    }
}

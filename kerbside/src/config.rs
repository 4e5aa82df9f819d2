use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::RegionEnvironment;
use crate::error::KerbsideError;
use crate::factory::SourceDirectories;
use crate::region::RegionFilter;
use crate::render::RenderOptions;

/// Settings of a [`RegionEnvironment`] that can be stored in a JSON file.
///
/// Every field is optional in the file:
///
/// ```json
/// {
///     "directories": { "road": "/data/kerbs", "traffic_sign": "/data/signs" },
///     "road_function": 1,
///     "render": { "size": [800, 600], "fill": "#4682B4" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Source directories. If not set, the default layout under the working directory is used.
    pub directories: Option<SourceDirectories>,
    /// `function` code roads are filtered by.
    pub road_function: Option<i64>,
    /// `function` code traffic signs are filtered by.
    pub traffic_sign_function: Option<i64>,
    /// Visualization options.
    pub render: RenderOptions,
}

impl EnvironmentConfig {
    /// Parses the configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, KerbsideError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, KerbsideError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());

        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Configured directories, or the default layout under `working_dir`.
    pub fn directories_in(&self, working_dir: impl AsRef<Path>) -> SourceDirectories {
        self.directories
            .clone()
            .unwrap_or_else(|| SourceDirectories::in_dir(working_dir))
    }

    /// Creates an environment for `region` with the configured directories and filters.
    pub fn build_environment(
        &self,
        region: RegionFilter,
        working_dir: impl AsRef<Path>,
    ) -> RegionEnvironment {
        RegionEnvironment::new(region, self.directories_in(working_dir))
            .with_road_filter(self.road_function)
            .with_traffic_sign_filter(self.traffic_sign_function)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;
    use geo_types::Rect;
    use tempfile::TempDir;

    use super::*;
    use crate::render::Color;
    use crate::test_utils::{city_object, write_city_model};

    #[test]
    fn empty_object_gives_defaults() {
        let config = EnvironmentConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EnvironmentConfig::default());
        assert_eq!(config.render.size, [600, 600]);
    }

    #[test]
    fn parses_all_fields() {
        let config = EnvironmentConfig::from_json_str(
            r##"{
                "directories": { "road": "/data/kerbs", "traffic_sign": "/data/signs" },
                "road_function": 1,
                "traffic_sign_function": 1000,
                "render": { "size": [800, 400], "background": "#000000" }
            }"##,
        )
        .unwrap();

        assert_eq!(
            config.directories_in("/ignored"),
            SourceDirectories::new("/data/kerbs", "/data/signs")
        );
        assert_eq!(config.road_function, Some(1));
        assert_eq!(config.traffic_sign_function, Some(1000));
        assert_eq!(config.render.size, [800, 400]);
        assert_eq!(config.render.background, Color::BLACK);
    }

    #[test]
    fn default_directories_are_under_working_dir() {
        let dirs = EnvironmentConfig::default().directories_in("/city");
        assert_eq!(dirs.road, PathBuf::from("/city/Road Kerb"));
        assert_eq!(dirs.traffic_sign, PathBuf::from("/city/Traffic Sign"));
    }

    #[test]
    fn invalid_config() {
        assert_matches!(
            EnvironmentConfig::from_json_str(r#"{"road_function": "one"}"#),
            Err(KerbsideError::InvalidConfig(_))
        );
        assert_matches!(
            EnvironmentConfig::from_json_file("/does/not/exist.json"),
            Err(KerbsideError::Io(_))
        );
    }

    #[test]
    fn builds_filtered_environment() {
        let root = TempDir::new().unwrap();
        write_city_model(
            &root.path().join("Road Kerb"),
            "roads.gml",
            &[
                city_object("kerb", Some(1), 1, 0.0, 0.0),
                city_object("lane", Some(2), 1, 2.0, 0.0),
            ],
        );

        let config_path = root.path().join("config.json");
        std::fs::write(&config_path, r#"{"road_function": 2}"#).unwrap();

        let config = EnvironmentConfig::from_json_file(&config_path).unwrap();
        let region =
            RegionFilter::new(Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon().into()).unwrap();
        let env = config.build_environment(region, root.path());

        let roads = env.generate_roads().unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].name(), "lane");
    }
}

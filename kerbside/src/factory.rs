use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use kerbside_gml::{FeatureRow, FeatureTable, GmlReader};
use serde::{Deserialize, Serialize};

use crate::category::FeatureCategory;
use crate::entity::FeatureEntity;
use crate::error::KerbsideError;
use crate::reader::FeatureReader;
use crate::region::RegionFilter;

/// Extension of the files scanned in the source directories. Compared case-sensitively.
pub const GML_EXTENSION: &str = "gml";

/// Attributes the factory never uses. Passed to the reader so that it can skip them.
pub const IGNORED_FIELDS: [&str; 9] = [
    "gml_id",
    "creationDate",
    "class",
    "usage",
    "usage_",
    "relativeToTerrain",
    "informationSystem",
    "externalReference|externalObject|name",
    "surfaceMaterial",
];

/// Source directory of every feature category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDirectories {
    /// Directory with road files.
    pub road: PathBuf,
    /// Directory with traffic sign files.
    pub traffic_sign: PathBuf,
}

impl SourceDirectories {
    /// Creates the table from explicit paths.
    pub fn new(road: impl Into<PathBuf>, traffic_sign: impl Into<PathBuf>) -> Self {
        Self {
            road: road.into(),
            traffic_sign: traffic_sign.into(),
        }
    }

    /// Default layout: one subdirectory of `root` per category, named by
    /// [`FeatureCategory::default_dir_name`].
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(
            root.join(FeatureCategory::Road.default_dir_name()),
            root.join(FeatureCategory::TrafficSign.default_dir_name()),
        )
    }

    /// Directory of the given category.
    pub fn get(&self, category: FeatureCategory) -> &Path {
        match category {
            FeatureCategory::Road => &self.road,
            FeatureCategory::TrafficSign => &self.traffic_sign,
        }
    }

    /// Returns a copy of the table with the directory of `category` replaced.
    pub fn with(mut self, category: FeatureCategory, path: impl Into<PathBuf>) -> Self {
        match category {
            FeatureCategory::Road => self.road = path.into(),
            FeatureCategory::TrafficSign => self.traffic_sign = path.into(),
        }

        self
    }
}

/// Result of [`FeatureFactory::resolve`]: where to look for the files and how to build entities
/// from them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// Source directory of the category.
    pub directory: &'a Path,
    /// Category the entities are created with.
    pub category: FeatureCategory,
}

impl Resolved<'_> {
    /// Creates an entity of the resolved category from a table row.
    pub fn construct(
        &self,
        table: &FeatureTable,
        index: usize,
    ) -> Result<FeatureEntity, KerbsideError> {
        FeatureEntity::from_table(self.category, table, index)
    }
}

/// Loads city objects of one category.
///
/// The factory configuration is fixed at construction. To change the directory or the filter,
/// use the `with_*` methods, which consume the factory and return a reconfigured one.
#[derive(Debug, Clone)]
pub struct FeatureFactory<R = GmlReader> {
    category: FeatureCategory,
    attribute_filter: Option<i64>,
    directories: SourceDirectories,
    reader: R,
}

impl FeatureFactory<GmlReader> {
    /// Creates a factory reading CityGML files of the `category`.
    pub fn new(category: FeatureCategory, directories: SourceDirectories) -> Self {
        Self {
            category,
            attribute_filter: None,
            directories,
            reader: GmlReader::default(),
        }
    }

    /// Creates a factory for the category given by its tag (`"road"` or `"trafficsign"`).
    /// Letter case and surrounding whitespace of the tag are ignored.
    pub fn from_tag(tag: &str, directories: SourceDirectories) -> Result<Self, KerbsideError> {
        Ok(Self::new(tag.parse()?, directories))
    }
}

impl<R: FeatureReader> FeatureFactory<R> {
    /// Replaces the reader used to load the files.
    pub fn with_reader<T: FeatureReader>(self, reader: T) -> FeatureFactory<T> {
        FeatureFactory {
            category: self.category,
            attribute_filter: self.attribute_filter,
            directories: self.directories,
            reader,
        }
    }

    /// Sets the `function` code the loaded objects must have. `None` loads all objects.
    pub fn with_attribute_filter(mut self, attribute_filter: Option<i64>) -> Self {
        self.attribute_filter = attribute_filter;
        self
    }

    /// Overrides the source directory of a category. The path is not checked until the files are
    /// loaded.
    pub fn with_directory(mut self, category: FeatureCategory, path: impl Into<PathBuf>) -> Self {
        self.directories = self.directories.with(category, path);
        self
    }

    /// Category of the loaded objects.
    pub fn category(&self) -> FeatureCategory {
        self.category
    }

    /// `function` code filter.
    pub fn attribute_filter(&self) -> Option<i64> {
        self.attribute_filter
    }

    /// Source directories.
    pub fn directories(&self) -> &SourceDirectories {
        &self.directories
    }

    /// Returns the source directory of the factory's category and the way to construct entities.
    pub fn resolve(&self) -> Resolved<'_> {
        Resolved {
            directory: self.directories.get(self.category),
            category: self.category,
        }
    }

    /// Loads all the objects of the category.
    ///
    /// Every `.gml` file in the category directory is read with the region's bounding rectangle as
    /// a spatial filter. Rows are kept if no attribute filter is set or their `function` equals
    /// the filter. Files are processed in the order of their names and rows in the order of the
    /// table. Any failure aborts the whole call.
    pub fn get_city_objects(
        &self,
        bbox: Option<&RegionFilter>,
    ) -> Result<Vec<FeatureEntity>, KerbsideError> {
        let resolved = self.resolve();
        let files = gml_files(resolved.directory)?;
        let bbox = bbox.map(RegionFilter::bounding_rect);

        let mut items = vec![];
        for path in files {
            let table = self
                .reader
                .read(&path, bbox, &IGNORED_FIELDS)
                .map_err(|err| KerbsideError::FeatureFileRead {
                    path: path.clone(),
                    source: Box::new(err),
                })?;

            let count = items.len();
            for (index, row) in table.rows().iter().enumerate() {
                if self.matches(row)? {
                    items.push(resolved.construct(&table, index)?);
                }
            }

            log::debug!(
                "Selected {} of {} {} objects from {}",
                items.len() - count,
                table.len(),
                self.category,
                path.display()
            );
        }

        log::info!("Loaded {} {} objects", items.len(), self.category);
        Ok(items)
    }

    fn matches(&self, row: &FeatureRow) -> Result<bool, KerbsideError> {
        let Some(filter) = self.attribute_filter else {
            return Ok(true);
        };

        let value = row.function.as_deref();
        let code = value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or_else(|| KerbsideError::InvalidAttribute {
                field: "function".into(),
                value: value.map(String::from),
            })?;

        Ok(code == filter)
    }
}

/// Lists `.gml` files in the directory sorted by name.
fn gml_files(directory: &Path) -> Result<Vec<PathBuf>, KerbsideError> {
    if !directory.is_dir() {
        return Err(KerbsideError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut files = vec![];
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() || path.extension() != Some(OsStr::new(GML_EXTENSION)) {
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

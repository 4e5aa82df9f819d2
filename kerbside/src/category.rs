use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KerbsideError;

/// Category of city objects.
///
/// Every category has its own source directory. The category does not change how the objects are
/// built, it only tells where they come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureCategory {
    /// Road surfaces and kerbs.
    Road,
    /// Traffic signs.
    TrafficSign,
}

impl FeatureCategory {
    /// All categories in the order their objects are generated.
    pub const ALL: [FeatureCategory; 2] = [FeatureCategory::Road, FeatureCategory::TrafficSign];

    /// Name of the directory the category's files are stored in by default.
    pub fn default_dir_name(&self) -> &'static str {
        match self {
            FeatureCategory::Road => "Road Kerb",
            FeatureCategory::TrafficSign => "Traffic Sign",
        }
    }

    /// Tag of the category, as accepted by [`FeatureCategory::from_str`].
    pub fn tag(&self) -> &'static str {
        match self {
            FeatureCategory::Road => "road",
            FeatureCategory::TrafficSign => "trafficsign",
        }
    }
}

impl FromStr for FeatureCategory {
    type Err = KerbsideError;

    /// Parses the category tag. Surrounding whitespace and letter case are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.tag() == tag)
            .ok_or_else(|| KerbsideError::UnknownCategory(s.to_string()))
    }
}

impl Display for FeatureCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureCategory::Road => write!(f, "road"),
            FeatureCategory::TrafficSign => write!(f, "traffic sign"),
        }
    }
}

//! Spot sources
//!
//! Where each category's spots come from is configuration; the catalog only
//! sees the [`SpotSource`] trait.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{Category, Spot};
use crate::config::DataConfig;
use crate::{Result, TravelGuideError};

const NAME_KEY: &str = "景点名称";
const CATEGORY_KEY: &str = "分类";

/// Loads the spots of one category
pub trait SpotSource {
    fn load(&self, category: Category) -> Result<Vec<Spot>>;
}

/// Reads one JSON file per category from a data directory
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
    scenic_file: String,
    romantic_file: String,
    family_file: String,
}

#[derive(Debug, Deserialize)]
struct SpotFile {
    #[serde(rename = "景点列表", default)]
    spots: Vec<Map<String, Value>>,
}

impl JsonFileSource {
    #[must_use]
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            scenic_file: config.scenic_file.clone(),
            romantic_file: config.romantic_file.clone(),
            family_file: config.family_file.clone(),
        }
    }

    /// File backing `category`
    #[must_use]
    pub fn path_for(&self, category: Category) -> PathBuf {
        let file = match category {
            Category::Scenic => &self.scenic_file,
            Category::Romantic => &self.romantic_file,
            Category::Family => &self.family_file,
        };
        self.dir.join(file)
    }
}

impl SpotSource for JsonFileSource {
    fn load(&self, category: Category) -> Result<Vec<Spot>> {
        let path = self.path_for(category);
        debug!("Loading {} spots from {:?}", category, path);

        let content = read_file(category, &path)?;
        let spots = parse_spot_file(category, &content)?;

        debug!("Loaded {} {} spots", spots.len(), category);
        Ok(spots)
    }
}

fn read_file(category: Category, path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TravelGuideError::data_load(
            category.code(),
            format!("Failed to read {}: {e}", path.display()),
        )
    })
}

/// Parse a category file of the form `{"景点列表": [{"景点名称": ..., ...}, ...]}`.
///
/// Records without a non-empty string name are skipped.
pub fn parse_spot_file(category: Category, content: &str) -> Result<Vec<Spot>> {
    let file: SpotFile = serde_json::from_str(content)
        .map_err(|e| TravelGuideError::data_load(category.code(), e.to_string()))?;

    let mut spots = Vec::with_capacity(file.spots.len());
    for (index, mut record) in file.spots.into_iter().enumerate() {
        let name = match record.remove(NAME_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            _ => {
                warn!(
                    "Skipping {} record #{} without a usable {}",
                    category, index, NAME_KEY
                );
                continue;
            }
        };
        // The resolved label replaces whatever the raw record carried.
        record.remove(CATEGORY_KEY);

        spots.push(Spot {
            name,
            category,
            details: record,
        });
    }

    Ok(spots)
}

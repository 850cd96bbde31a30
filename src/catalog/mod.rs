//! Spot catalog
//!
//! This module holds the read-only spot reference data the assistant feeds to
//! the model, together with the lookups used to build request context:
//! - Literal substring search over spot names
//! - A lightweight listing of every spot
//! - Exact-name detail lookup

pub mod source;

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{info, warn};

pub use source::{JsonFileSource, SpotSource};

/// Default number of spots returned by [`Catalog::search`]
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Spot category as stored in the reference data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Scenic,
    Romantic,
    Family,
}

impl Category {
    /// All categories, in the order the catalog scans them
    pub const ALL: [Category; 3] = [Category::Scenic, Category::Romantic, Category::Family];

    /// Raw category code used in configuration and logs
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Category::Scenic => "scenic",
            Category::Romantic => "romantic",
            Category::Family => "family",
        }
    }

    /// Display label exposed to the model and API consumers
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Scenic => "经典景点",
            Category::Romantic => "浪漫景点",
            Category::Family => "亲子景点",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn serialize_label<S: Serializer>(category: &Category, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.label())
}

/// A named point of interest from the reference data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spot {
    #[serde(rename = "景点名称")]
    pub name: String,
    #[serde(rename = "分类", serialize_with = "serialize_label")]
    pub category: Category,
    /// Remaining descriptive fields, carried through unmodified
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Spot {
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            details: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Name and category label of a spot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotSummary {
    #[serde(rename = "景点名称")]
    pub name: String,
    #[serde(rename = "分类")]
    pub category: &'static str,
}

/// Immutable in-memory collection of all spots, grouped by category
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<(Category, Vec<Spot>)>,
}

impl Catalog {
    /// Load every category from `source`.
    ///
    /// A category that fails to load is logged and left empty; this never fails
    /// as a whole.
    pub fn load_all(source: &dyn SpotSource) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let spots = source.load(category).unwrap_or_else(|e| {
                    warn!("Treating category {} as empty: {}", category, e);
                    Vec::new()
                });
                (category, spots)
            })
            .collect::<Vec<_>>();

        let catalog = Self { categories };
        info!("Loaded spot catalog with {} spots", catalog.len());
        catalog
    }

    /// Build a catalog from already loaded category lists, keeping their order
    #[must_use]
    pub fn from_categories(categories: Vec<(Category, Vec<Spot>)>) -> Self {
        Self { categories }
    }

    /// Spots whose name contains `query` literally, in catalog order, at most `limit`
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Spot> {
        self.spots()
            .filter(|spot| spot.name.contains(query))
            .take(limit)
            .collect()
    }

    #[must_use]
    pub fn list_all(&self) -> Vec<SpotSummary> {
        self.spots()
            .map(|spot| SpotSummary {
                name: spot.name.clone(),
                category: spot.category.label(),
            })
            .collect()
    }

    /// Exact name lookup across all categories; the first match wins
    #[must_use]
    pub fn get_details(&self, name: &str) -> Option<&Spot> {
        self.spots().find(|spot| spot.name == name)
    }

    /// Spots of a single category
    #[must_use]
    pub fn spots_in(&self, category: Category) -> &[Spot] {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, spots)| spots.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, spots)| spots.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spots(&self) -> impl Iterator<Item = &Spot> {
        self.categories.iter().flat_map(|(_, spots)| spots.iter())
    }
}

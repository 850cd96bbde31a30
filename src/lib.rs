//! `travelguide` - travel question assistant
//!
//! This library answers natural-language travel questions with a language
//! model grounded in local spot data, and turns the model's inline `@map`
//! markers into clickable map search links.

pub mod answer;
pub mod api;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod logging;
pub mod map_link;
pub mod model;
pub mod web;

// Re-export core types for public API
pub use answer::{MarkerFields, parse_marker, rewrite_markers};
pub use assistant::{QueryContext, TravelAssistant};
pub use catalog::{Catalog, Category, JsonFileSource, Spot, SpotSource, SpotSummary};
pub use config::AppConfig;
pub use error::TravelGuideError;
pub use geocoding::{CityInfo, GeocodingClient, extract_city};
pub use map_link::MapLinkResolver;
pub use model::{AnswerModel, DeepSeekClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelGuideError>;

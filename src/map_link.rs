//! Map link construction
//!
//! Turns a city / point-of-interest pair into a Gaode (Amap) search deep link.
//! No request is made; the link is assumed valid by whoever opens it.

use crate::{Result, TravelGuideError};

/// Default Amap URI search endpoint
pub const DEFAULT_LINK_BASE_URL: &str = "https://uri.amap.com/search";

/// Builds map search links for city / point-of-interest pairs
#[derive(Debug, Clone)]
pub struct MapLinkResolver {
    api_key: String,
    base_url: String,
}

impl MapLinkResolver {
    /// Create a resolver using the default link endpoint.
    ///
    /// Fails when the map credential is missing or blank.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_LINK_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<&str>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TravelGuideError::config("GAODE_API_KEY is not set"))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.into(),
        })
    }

    /// Build the search link.
    ///
    /// With a point of interest it becomes the keyword and the city narrows the
    /// search; without one the city is the keyword.
    #[must_use]
    pub fn build_link(&self, city: &str, poi: Option<&str>) -> String {
        let keywords = poi.unwrap_or(city);
        format!(
            "{}?keywords={}&city={}&callnative=1",
            self.base_url, keywords, city
        )
    }

    /// Map credential, shared with the Gaode REST helpers
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

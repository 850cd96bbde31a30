//! Gaode REST helpers
//!
//! City extraction from free text plus the two Gaode lookups behind it:
//! address geocoding and city centre search.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::{Result, TravelGuideError};

/// Gaode POI type code for cities
const CITY_POI_TYPE: &str = "190100";

static CITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:在|位于|去|到|游览|参观|游玩)?(\w+?(?:市|县|区))(?:的|是|有|旅游|景点|玩什么)")
        .expect("city pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    /// Parse Gaode's `"longitude,latitude"` format
    pub fn parse(location: &str) -> Result<Self> {
        let (lng, lat) = location.split_once(',').ok_or_else(|| {
            TravelGuideError::api(format!("Invalid coordinate format: {location}"))
        })?;

        let longitude = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| TravelGuideError::api(format!("Invalid longitude: {lng}")))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| TravelGuideError::api(format!("Invalid latitude: {lat}")))?;

        Ok(Self {
            longitude,
            latitude,
        })
    }
}

/// City centre as reported by Gaode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityInfo {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub adcode: String,
}

impl CityInfo {
    /// Centre of Yantai, used when no better location is known
    #[must_use]
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            longitude: 121.391382,
            latitude: 37.539297,
            adcode: "370600".to_string(),
        }
    }
}

/// Pull a city name out of a question, stripping the 市/县/区 suffix.
///
/// Returns `default_city` when nothing matches.
#[must_use]
pub fn extract_city(text: &str, default_city: &str) -> String {
    CITY_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            let name = m.as_str();
            name.strip_suffix(|c: char| matches!(c, '市' | '县' | '区'))
                .unwrap_or(name)
                .to_string()
        })
        .unwrap_or_else(|| default_city.to_string())
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    geocodes: Vec<Geocode>,
}

#[derive(Debug, Deserialize)]
struct Geocode {
    location: String,
}

#[derive(Debug, Deserialize)]
struct PlaceResponse {
    status: String,
    #[serde(default)]
    pois: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
struct Poi {
    location: String,
    #[serde(default)]
    adcode: String,
}

/// Client for the Gaode geocoding and place search APIs
pub struct GeocodingClient {
    client: Client,
    api_key: String,
    base_url: String,
    default_city: String,
}

impl GeocodingClient {
    pub fn new(api_key: &str, config: &MapConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| TravelGuideError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.rest_base_url.trim_end_matches('/').to_string(),
            default_city: config.default_city.clone(),
        })
    }

    /// City assumed when a question or request names none
    #[must_use]
    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// Coordinates of `address` within `city`, if Gaode knows it
    pub async fn geocode(&self, address: &str, city: &str) -> Result<Option<Coordinates>> {
        debug!("Geocoding {} in {}", address, city);

        let response: GeocodeResponse = self
            .get_json(
                "geocode/geo",
                &[("key", self.api_key.as_str()), ("address", address), ("city", city)],
            )
            .await?;

        if response.status != "1" {
            return Ok(None);
        }
        response
            .geocodes
            .first()
            .map(|g| Coordinates::parse(&g.location))
            .transpose()
    }

    /// Centre and administrative code of `city_name`
    pub async fn search_city(&self, city_name: &str) -> Result<Option<CityInfo>> {
        debug!("Searching city {}", city_name);

        let response: PlaceResponse = self
            .get_json(
                "place/text",
                &[
                    ("key", self.api_key.as_str()),
                    ("keywords", city_name),
                    ("types", CITY_POI_TYPE),
                    ("city", city_name),
                    ("offset", "1"),
                    ("page", "1"),
                    ("extensions", "all"),
                ],
            )
            .await?;

        if response.status != "1" {
            return Ok(None);
        }
        let Some(poi) = response.pois.first() else {
            return Ok(None);
        };

        let coordinates = Coordinates::parse(&poi.location)?;
        Ok(Some(CityInfo {
            name: city_name.to_string(),
            longitude: coordinates.longitude,
            latitude: coordinates.latitude,
            adcode: poi.adcode.clone(),
        }))
    }

    /// City mentioned in `text`, with its centre.
    ///
    /// Lookup failures are logged and answered with the Yantai centre under
    /// the extracted name.
    pub async fn locate(&self, text: &str) -> CityInfo {
        let city = extract_city(text, &self.default_city);

        match self.search_city(&city).await {
            Ok(Some(info)) => {
                info!("Located {} at ({}, {})", info.name, info.longitude, info.latitude);
                info
            }
            Ok(None) => {
                debug!("No city match for {}, using fallback centre", city);
                CityInfo::fallback(&city)
            }
            Err(e) => {
                warn!("City search for {} failed: {}", city, e);
                CityInfo::fallback(&city)
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| TravelGuideError::api(format!("Gaode request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TravelGuideError::api(format!(
                "Gaode API returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TravelGuideError::api(format!("Malformed Gaode response: {e}")))
    }
}

//! HTTP client for the places text-search API

use crate::{PlannerConfig, PlannerError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub const PLACE_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

/// Maximum number of attractions kept from a search
pub const MAX_ATTRACTIONS: usize = 5;

/// A tourist attraction near the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Attraction {
    pub fn rating_display(&self) -> String {
        match self.rating {
            Some(rating) => format!("{}", rating),
            None => "N/A".to_string(),
        }
    }
}

/// Outcome of an attraction lookup. Failures are a state, not an error,
/// so the rest of a trip plan can still be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttractionLookup {
    Found { attractions: Vec<Attraction> },
    Empty,
    Unavailable { reason: String },
}

impl AttractionLookup {
    pub fn attractions(&self) -> &[Attraction] {
        match self {
            AttractionLookup::Found { attractions } => attractions,
            _ => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: Option<String>,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl PlaceResult {
    fn into_attraction(self) -> Result<Attraction, PlannerError> {
        let name = self.name.unwrap_or_else(|| "Unknown".to_string());
        let location = self
            .geometry
            .map(|g| g.location)
            .ok_or_else(|| PlannerError::PlacesError(format!("result '{}' has no coordinates", name)))?;

        Ok(Attraction {
            address: self
                .formatted_address
                .unwrap_or_else(|| "No address".to_string()),
            rating: self.rating,
            latitude: location.lat,
            longitude: location.lng,
            name,
        })
    }
}

/// Parse a text-search response body into at most five attractions
pub fn parse_search_response(body: &str) -> Result<Vec<Attraction>, PlannerError> {
    let response: TextSearchResponse = serde_json::from_str(body)?;

    match response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(status) => {
            let message = response.error_message.unwrap_or_default();
            return Err(PlannerError::PlacesError(
                format!("{} {}", status, message).trim_end().to_string(),
            ));
        }
    }

    response
        .results
        .into_iter()
        .take(MAX_ATTRACTIONS)
        .map(PlaceResult::into_attraction)
        .collect()
}

/// Client for the places text-search endpoint
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http_client: Client,
    search_url: String,
    api_key: Option<String>,
}

impl PlacesClient {
    /// Create a new places client
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, PlannerError> {
        debug!("Creating new places client");
        let http_client = Client::builder()
            .user_agent(concat!("travel-planner/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            search_url: PLACE_SEARCH_URL.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        Ok(Self::new(config.places_api_key.clone(), config.request_timeout)?
            .with_search_url(config.places_search_url.clone()))
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Search for tourist attractions in `destination`
    #[instrument(level = "info", skip(self))]
    pub async fn search_attractions(&self, destination: &str) -> Result<Vec<Attraction>, PlannerError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PlannerError::ConfigError("PLACES_API_KEY is not set".to_string()))?;
        let query = format!("tourist attractions in {}", destination);

        info!(url = %self.search_url, "Making places text-search request");
        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&self.search_url)
            .query(&[("query", query.as_str()), ("key", api_key)])
            .send()
            .await?;
        let status = response.status();

        info!(
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        if !status.is_success() {
            error!(status = %status, "Places request failed");
            return Err(PlannerError::PlacesError(format!(
                "request failed with status: {}",
                status
            )));
        }

        let body = response.text().await?;
        let attractions = parse_search_response(&body)?;
        info!(attractions = attractions.len(), "Places response parsed");
        Ok(attractions)
    }

    /// Like [`search_attractions`](Self::search_attractions), with every
    /// failure folded into [`AttractionLookup::Unavailable`]
    pub async fn lookup(&self, destination: &str) -> AttractionLookup {
        match self.search_attractions(destination).await {
            Ok(attractions) if attractions.is_empty() => AttractionLookup::Empty,
            Ok(attractions) => AttractionLookup::Found { attractions },
            Err(e) => {
                warn!(destination, error = %e, "Attraction lookup failed");
                AttractionLookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

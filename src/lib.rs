//! # Travel Planner Library
//!
//! Plans a trip from a table of historical flights: forecasts the fare for a
//! route and date, predicts the weather from the route's seasonal history,
//! proposes nearby dates with better weather, looks up tourist attractions
//! at the destination and summarises the whole dataset for analytics.

pub mod alternates;
pub mod analytics;
pub mod config;
pub mod cost;
pub mod dataset;
pub mod forecast;
pub mod logging;
pub mod places;
pub mod planner;
pub mod render;
pub mod weather;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use alternates::{AlternateDate, AlternateDateSearch, AlternateDates};
pub use analytics::{Analytics, AnalyticsReport, FlightSummary, GroupStat, WeatherCount};
pub use config::PlannerConfig;
pub use cost::{CostEstimator, CostPrediction};
pub use dataset::HistoricalDataset;
pub use forecast::{AdditiveModel, FittedModel, ForecastError, Observation};
pub use places::{Attraction, AttractionLookup, PlacesClient};
pub use planner::{TripPlan, TripPlanner, TripQuery};
pub use weather::{NoDataReason, WeatherEstimator, WeatherPrediction};

/// Error types for the travel planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV parsing failed: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Flight data is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid date format: {0}")]
    DateParseError(String),

    #[error("Places API error: {0}")]
    PlacesError(String),

    #[error("Forecast failed: {0}")]
    ForecastError(#[from] ForecastError),

    #[error("Historical dataset has already been loaded")]
    DatasetAlreadyLoaded,

    #[error("Historical dataset has not been loaded")]
    DatasetNotLoaded,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Parse a user supplied travel date in YYYY-MM-DD format
pub fn parse_travel_date(date: &str) -> Result<NaiveDate, PlannerError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| PlannerError::DateParseError(format!("expected YYYY-MM-DD, got {}", date)))
}

/// Historical weather condition recorded for a flight
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum WeatherLabel {
    Clear,
    Cloudy,
    Sunny,
    Rainy,
    Snowy,
    Stormy,
    Foggy,
    /// Any label outside the known set, kept verbatim
    Other(String),
}

impl WeatherLabel {
    /// Clear, Cloudy and Sunny are good days to travel
    pub fn is_favorable(&self) -> bool {
        matches!(self, WeatherLabel::Clear | WeatherLabel::Cloudy | WeatherLabel::Sunny)
    }

    /// Display symbol used by every view
    pub fn symbol(&self) -> &'static str {
        match self {
            WeatherLabel::Clear => "☀️",
            WeatherLabel::Cloudy => "⛅",
            WeatherLabel::Sunny => "🌞",
            WeatherLabel::Rainy => "🌧️",
            WeatherLabel::Snowy => "❄️",
            WeatherLabel::Stormy => "⛈️",
            WeatherLabel::Foggy => "🌫️",
            WeatherLabel::Other(_) => "🌍",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WeatherLabel::Clear => "Clear",
            WeatherLabel::Cloudy => "Cloudy",
            WeatherLabel::Sunny => "Sunny",
            WeatherLabel::Rainy => "Rainy",
            WeatherLabel::Snowy => "Snowy",
            WeatherLabel::Stormy => "Stormy",
            WeatherLabel::Foggy => "Foggy",
            WeatherLabel::Other(label) => label,
        }
    }
}

impl FromStr for WeatherLabel {
    type Err = std::convert::Infallible;

    // Labels are exact-match keys, so "clear" stays an unrecognised label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Clear" => WeatherLabel::Clear,
            "Cloudy" => WeatherLabel::Cloudy,
            "Sunny" => WeatherLabel::Sunny,
            "Rainy" => WeatherLabel::Rainy,
            "Snowy" => WeatherLabel::Snowy,
            "Stormy" => WeatherLabel::Stormy,
            "Foggy" => WeatherLabel::Foggy,
            other => WeatherLabel::Other(other.to_string()),
        })
    }
}

impl From<String> for WeatherLabel {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(label) => label,
            Err(never) => match never {},
        }
    }
}

impl From<WeatherLabel> for String {
    fn from(label: WeatherLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the historical flight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub date: NaiveDate,
    pub start_country: String,
    pub destination_country: String,
    pub weather: WeatherLabel,
    pub cost: f64,
    pub fuel_cost: f64,
    pub airline: String,
    pub seat_class: String,
    pub passengers: u32,
    pub flight_name: String,
}

impl FlightRecord {
    /// Exact, case-sensitive route match
    pub fn is_route(&self, source: &str, destination: &str) -> bool {
        self.start_country == source && self.destination_country == destination
    }
}

/// Plan a trip against the process-wide dataset
pub async fn plan_trip(query: TripQuery, config: &PlannerConfig) -> Result<TripPlan, PlannerError> {
    let dataset = HistoricalDataset::global()?;
    let planner = TripPlanner::new(dataset, PlacesClient::from_config(config)?);
    planner.plan(&query).await
}

/// Compute the analytics view over the process-wide dataset
pub fn analytics_report() -> Result<AnalyticsReport, PlannerError> {
    let dataset = HistoricalDataset::global()?;
    Ok(Analytics::new(dataset).report())
}

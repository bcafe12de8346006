//! Runtime configuration assembled from defaults, `.env` and the environment

use crate::places::PLACE_SEARCH_URL;
use crate::PlannerError;
use ::config::{Config, Environment, Map};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the places API credential
pub const API_KEY_VAR: &str = "PLACES_API_KEY";

/// Prefix of the remaining overrides, e.g. `TRAVEL_PLANNER_REQUEST_TIMEOUT_SECS`
pub const ENV_PREFIX: &str = "TRAVEL_PLANNER";

pub const DEFAULT_DATASET_PATH: &str = "flight_data.csv";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// CSV file with the historical flights
    pub dataset_path: PathBuf,
    pub places_api_key: Option<String>,
    pub places_search_url: String,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
}

/// Flat settings as they come out of the layered sources
#[derive(Debug, Deserialize)]
struct Settings {
    dataset_path: PathBuf,
    places_api_key: Option<String>,
    places_search_url: String,
    request_timeout_secs: u64,
    log_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            places_api_key: None,
            places_search_url: PLACE_SEARCH_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl PlannerConfig {
    /// Defaults, then `TRAVEL_PLANNER_*` variables, then `PLACES_API_KEY`.
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self, PlannerError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(PlannerError::ConfigError(format!("invalid .env file: {}", e))),
        }

        Self::load(None, env::var(API_KEY_VAR).ok())
    }

    /// Build from an explicit variable map instead of the process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, PlannerError> {
        let api_key = vars.get(API_KEY_VAR).cloned();
        Self::load(Some(vars), api_key)
    }

    fn load(vars: Option<Map<String, String>>, api_key: Option<String>) -> Result<Self, PlannerError> {
        let settings = Self::settings(vars, api_key)
            .map_err(|e| PlannerError::ConfigError(e.to_string()))?;

        Ok(Self {
            dataset_path: settings.dataset_path,
            places_api_key: settings
                .places_api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            places_search_url: settings.places_search_url,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            log_dir: settings.log_dir,
        })
    }

    fn settings(
        vars: Option<Map<String, String>>,
        api_key: Option<String>,
    ) -> Result<Settings, ::config::ConfigError> {
        Config::builder()
            .set_default("dataset_path", DEFAULT_DATASET_PATH)?
            .set_default("places_search_url", PLACE_SEARCH_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT.as_secs())?
            .set_default("log_dir", DEFAULT_LOG_DIR)?
            // TRAVEL_PLANNER_* variables
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(vars))
            // The credential keeps its unprefixed name
            .set_override_option("places_api_key", api_key)?
            .build()?
            .try_deserialize()
    }

    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.places_api_key.is_some()
    }
}

// src/mcp_server.rs

use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    model::{ServerCapabilities, ServerInfo},
    schemars, tool,
    transport::stdio,
};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use travel_planner::{
    alternates::AlternateDateSearch,
    config::DEFAULT_DATASET_PATH,
    logging::{init_logging, LogTarget},
    parse_travel_date, Analytics, HistoricalDataset, PlacesClient, PlannerConfig, TripPlanner,
    TripQuery, WeatherEstimator,
};

/// Travel planning MCP server
#[derive(Clone)]
pub struct PlannerServer {
    dataset: &'static HistoricalDataset,
    places: PlacesClient,
}

impl PlannerServer {
    pub fn new(dataset: &'static HistoricalDataset, places: PlacesClient) -> Self {
        Self { dataset, places }
    }
}

/// Route and date shared by the prediction tools
#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct TripParams {
    #[schemars(description = "Source country exactly as it appears in the flight data (e.g., India)")]
    pub source: String,
    #[schemars(description = "Destination country exactly as it appears in the flight data (e.g., France)")]
    pub destination: String,
    #[schemars(description = "Travel date in YYYY-MM-DD format")]
    pub date: String,
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| error_json(format!("Failed to serialize results: {}", e)))
}

#[tool(tool_box)]
impl PlannerServer {
    /// Full trip plan: cost forecast, weather, alternate dates and attractions
    #[tool(description = "Predict the flight cost and weather for a route and travel date, suggest up to 5 alternate dates with favorable weather within 14 days, and list up to 5 tourist attractions at the destination.")]
    async fn plan_trip(&self, #[tool(aggr)] params: TripParams) -> String {
        info!(
            source = params.source,
            destination = params.destination,
            date = params.date,
            "Trip plan request received"
        );

        let date = match parse_travel_date(&params.date) {
            Ok(date) => date,
            Err(e) => {
                warn!("Invalid travel date: {}", e);
                return error_json(e);
            }
        };

        let planner = TripPlanner::new(self.dataset, self.places.clone());
        let query = TripQuery::new(params.source, params.destination, date);
        match planner.plan(&query).await {
            Ok(plan) => {
                debug!("Trip plan computed");
                to_json(&plan)
            }
            Err(e) => {
                error!("Trip planning failed: {}", e);
                error_json(format!("Trip planning failed: {}", e))
            }
        }
    }

    /// Seasonal weather prediction without the cost model or network calls
    #[tool(description = "Predict the weather for a route and travel date from historical flights in the same month, with alternate dates that have favorable weather.")]
    async fn predict_weather(&self, #[tool(aggr)] params: TripParams) -> String {
        info!(
            source = params.source,
            destination = params.destination,
            date = params.date,
            "Weather prediction request received"
        );

        let date = match parse_travel_date(&params.date) {
            Ok(date) => date,
            Err(e) => {
                warn!("Invalid travel date: {}", e);
                return error_json(e);
            }
        };

        let estimator = WeatherEstimator::new(self.dataset);
        let prediction = estimator.estimate(&params.source, &params.destination, date);
        let alternates = AlternateDateSearch::new(estimator).search(&params.source, &params.destination, date);

        serde_json::json!({
            "weather": prediction.label(),
            "symbol": prediction.predicted_label().map(|l| l.symbol()),
            "favorable": prediction.is_favorable(),
            "note": prediction.note(),
            "alternate_dates": alternates.suggestions,
        })
        .to_string()
    }

    /// Dataset-wide analytics
    #[tool(description = "Aggregate statistics over all historical flights: average cost by airline, average fuel cost by seat class, top 10 destinations by passengers, the 10 most expensive flights and the weather distribution.")]
    async fn get_analytics(&self) -> String {
        info!("Analytics request received");
        to_json(&Analytics::new(self.dataset).report())
    }
}

#[tool(tool_box)]
impl ServerHandler for PlannerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("A travel planning server backed by historical flight data. Predicts fares and seasonal weather, suggests alternate dates, finds tourist attractions and reports dataset analytics. Results are JSON.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dataset_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));
    let config = PlannerConfig::from_env()?.with_dataset_path(dataset_path);

    // Initialize logging before anything else
    if let Err(e) = init_logging(LogTarget::File, &config.log_dir, false) {
        eprintln!("Failed to initialize logging: {}", e);
        // Continue without logging rather than failing
    }

    info!("Starting MCP Travel Planner Server");
    if !config.has_api_key() {
        warn!("PLACES_API_KEY is not set; attraction lookups will be unavailable");
    }

    let dataset = HistoricalDataset::from_path(&config.dataset_path)?.install()?;
    if dataset.is_empty() {
        warn!(path = %config.dataset_path.display(), "Flight data contains no usable rows");
    }
    let server = PlannerServer::new(dataset, PlacesClient::from_config(&config)?);
    let transport = stdio();

    info!(flights = dataset.len(), "MCP server initialized, starting service");

    // SDK handles initialization, tool discovery, and message routing
    let service = server.serve(transport).await?;

    info!("MCP service started, waiting for requests");

    service.waiting().await?;

    info!("MCP service shutting down");
    Ok(())
}

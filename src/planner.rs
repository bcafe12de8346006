//! The "Predict" flow of the home view

use crate::{
    AlternateDateSearch, AlternateDates, AttractionLookup, CostEstimator, CostPrediction,
    HistoricalDataset, PlacesClient, PlannerError, WeatherEstimator, WeatherPrediction,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// User input for one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub source: String,
    pub destination: String,
    pub date: NaiveDate,
}

impl TripQuery {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            date,
        }
    }
}

/// Everything shown after pressing "Predict".
///
/// When no cost can be predicted only the cost note is shown, so alternates
/// and attractions are not computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub query: TripQuery,
    pub cost: CostPrediction,
    pub weather: WeatherPrediction,
    pub alternates: Option<AlternateDates>,
    pub attractions: Option<AttractionLookup>,
}

pub struct TripPlanner<'a> {
    dataset: &'a HistoricalDataset,
    places: PlacesClient,
}

impl<'a> TripPlanner<'a> {
    pub fn new(dataset: &'a HistoricalDataset, places: PlacesClient) -> Self {
        Self { dataset, places }
    }

    #[instrument(level = "info", skip(self, query), fields(source = %query.source, destination = %query.destination, date = %query.date))]
    pub async fn plan(&self, query: &TripQuery) -> Result<TripPlan, PlannerError> {
        let weather_estimator = WeatherEstimator::new(self.dataset);

        let cost = CostEstimator::new(self.dataset).estimate(&query.source, &query.destination, query.date)?;
        let weather = weather_estimator.estimate(&query.source, &query.destination, query.date);

        let (alternates, attractions) = if cost.amount().is_some() {
            let alternates = AlternateDateSearch::new(weather_estimator).search(
                &query.source,
                &query.destination,
                query.date,
            );
            let attractions = self.places.lookup(&query.destination).await;
            (Some(alternates), Some(attractions))
        } else {
            (None, None)
        };

        info!(
            cost = ?cost.amount(),
            weather = weather.label(),
            alternates = ?alternates.as_ref().map(AlternateDates::len),
            "Trip plan ready"
        );

        Ok(TripPlan {
            query: query.clone(),
            cost,
            weather,
            alternates,
            attractions,
        })
    }
}

//! Flight cost prediction from a route's fare history

use crate::{AdditiveModel, HistoricalDataset, Observation, PlannerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Caption shown under every successful prediction
pub const PREDICTION_CAPTION: &str = "Prediction based on historical trends";

/// Result of a cost estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CostPrediction {
    /// No historical flight on the route
    NoData,
    /// A single flight cannot determine a trend
    InsufficientData { rows: usize },
    Predicted { amount: f64 },
}

impl CostPrediction {
    pub fn amount(&self) -> Option<f64> {
        match self {
            CostPrediction::Predicted { amount } => Some(*amount),
            _ => None,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            CostPrediction::NoData => "Not enough data to predict cost.",
            CostPrediction::InsufficientData { .. } => "Insufficient data for model training.",
            CostPrediction::Predicted { .. } => PREDICTION_CAPTION,
        }
    }
}

/// Fits a fresh [`AdditiveModel`] on the route's (date, cost) series per call
#[derive(Debug, Clone)]
pub struct CostEstimator<'a> {
    dataset: &'a HistoricalDataset,
    model: AdditiveModel,
}

impl<'a> CostEstimator<'a> {
    pub fn new(dataset: &'a HistoricalDataset) -> Self {
        Self {
            dataset,
            model: AdditiveModel::default(),
        }
    }

    #[instrument(level = "info", skip(self))]
    pub fn estimate(
        &self,
        source: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<CostPrediction, PlannerError> {
        let series: Vec<Observation> = self
            .dataset
            .route(source, destination)
            .map(|r| Observation::new(r.date, r.cost))
            .collect();

        match series.len() {
            0 => return Ok(CostPrediction::NoData),
            rows @ 1 => return Ok(CostPrediction::InsufficientData { rows }),
            _ => {}
        }

        let fitted = self.model.fit(&series)?;
        let amount = round_cents(fitted.predict(date));
        debug!(rows = series.len(), amount, "Cost predicted");
        Ok(CostPrediction::Predicted { amount })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Seasonal weather prediction by majority vote over a route's history

use crate::{HistoricalDataset, WeatherLabel};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Why a prediction could not be made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    /// No historical flight on the route at all
    NoRouteData,
    /// Flights on the route exist, none in the requested month
    NoMonthData,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::NoRouteData => f.write_str("Not enough data to predict weather."),
            NoDataReason::NoMonthData => f.write_str("No historical data for this month."),
        }
    }
}

/// Result of a weather estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeatherPrediction {
    NoData { reason: NoDataReason },
    Predicted { label: WeatherLabel },
}

impl WeatherPrediction {
    /// The predicted label, or "No data"
    pub fn label(&self) -> &str {
        match self {
            WeatherPrediction::NoData { .. } => "No data",
            WeatherPrediction::Predicted { label } => label.as_str(),
        }
    }

    pub fn predicted_label(&self) -> Option<&WeatherLabel> {
        match self {
            WeatherPrediction::Predicted { label } => Some(label),
            WeatherPrediction::NoData { .. } => None,
        }
    }

    pub fn is_favorable(&self) -> bool {
        self.predicted_label().map_or(false, WeatherLabel::is_favorable)
    }

    /// Human readable advice shown next to the label
    pub fn note(&self) -> String {
        match self {
            WeatherPrediction::NoData { reason } => reason.to_string(),
            WeatherPrediction::Predicted { label } if label.is_favorable() => {
                "Weather looks good!".to_string()
            }
            WeatherPrediction::Predicted { .. } => {
                "Unfavorable weather. Try alternate date.".to_string()
            }
        }
    }
}

/// Predicts weather for a route and date from the same calendar month in past years
#[derive(Debug, Clone, Copy)]
pub struct WeatherEstimator<'a> {
    dataset: &'a HistoricalDataset,
}

impl<'a> WeatherEstimator<'a> {
    pub fn new(dataset: &'a HistoricalDataset) -> Self {
        Self { dataset }
    }

    pub fn estimate(&self, source: &str, destination: &str, date: NaiveDate) -> WeatherPrediction {
        let mut route_rows = self.dataset.route(source, destination).peekable();
        if route_rows.peek().is_none() {
            return WeatherPrediction::NoData {
                reason: NoDataReason::NoRouteData,
            };
        }

        let month = date.month();
        let labels = route_rows
            .filter(|r| r.date.month() == month)
            .map(|r| &r.weather);

        match majority_label(labels) {
            Some(label) => {
                debug!(source, destination, month, label = %label, "Weather predicted");
                WeatherPrediction::Predicted { label }
            }
            None => WeatherPrediction::NoData {
                reason: NoDataReason::NoMonthData,
            },
        }
    }
}

/// Most frequent label; among equally frequent labels the one seen first wins.
pub fn majority_label<'a>(labels: impl IntoIterator<Item = &'a WeatherLabel>) -> Option<WeatherLabel> {
    // (label, count) in first-seen order; the label set is tiny
    let mut counts: Vec<(&WeatherLabel, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&WeatherLabel, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlightRecord;

    fn record(date: &str, from: &str, to: &str, weather: WeatherLabel) -> FlightRecord {
        FlightRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_country: from.to_string(),
            destination_country: to.to_string(),
            weather,
            cost: 100.0,
            fuel_cost: 10.0,
            airline: "TestAir".to_string(),
            seat_class: "Economy".to_string(),
            passengers: 100,
            flight_name: "TA1".to_string(),
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn test_majority_vote_for_month() {
        let ds = HistoricalDataset::from_records(vec![
            record("2023-06-01", "India", "France", WeatherLabel::Clear),
            record("2022-06-15", "India", "France", WeatherLabel::Clear),
            record("2023-06-20", "India", "France", WeatherLabel::Rainy),
        ]);
        let prediction = WeatherEstimator::new(&ds).estimate("India", "France", june(10));
        assert_eq!(prediction, WeatherPrediction::Predicted { label: WeatherLabel::Clear });
        assert!(prediction.is_favorable());
        assert_eq!(prediction.note(), "Weather looks good!");
    }

    #[test]
    fn test_unfavorable_prediction() {
        let ds = HistoricalDataset::from_records(vec![
            record("2023-06-01", "India", "France", WeatherLabel::Stormy),
            record("2023-06-02", "India", "France", WeatherLabel::Stormy),
            record("2023-06-03", "India", "France", WeatherLabel::Sunny),
        ]);
        let prediction = WeatherEstimator::new(&ds).estimate("India", "France", june(1));
        assert_eq!(prediction.label(), "Stormy");
        assert!(!prediction.is_favorable());
        assert_eq!(prediction.note(), "Unfavorable weather. Try alternate date.");
    }

    #[test]
    fn test_no_route_data() {
        let ds = HistoricalDataset::from_records(vec![record(
            "2023-06-01",
            "India",
            "France",
            WeatherLabel::Clear,
        )]);
        let prediction = WeatherEstimator::new(&ds).estimate("France", "India", june(1));
        assert_eq!(
            prediction,
            WeatherPrediction::NoData { reason: NoDataReason::NoRouteData }
        );
        assert_eq!(prediction.label(), "No data");
    }

    #[test]
    fn test_no_month_data() {
        let ds = HistoricalDataset::from_records(vec![record(
            "2023-07-01",
            "India",
            "France",
            WeatherLabel::Clear,
        )]);
        let prediction = WeatherEstimator::new(&ds).estimate("India", "France", june(1));
        assert_eq!(
            prediction,
            WeatherPrediction::NoData { reason: NoDataReason::NoMonthData }
        );
        assert_eq!(prediction.note(), "No historical data for this month.");
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let labels = vec![
            WeatherLabel::Rainy,
            WeatherLabel::Clear,
            WeatherLabel::Clear,
            WeatherLabel::Rainy,
        ];
        assert_eq!(majority_label(&labels), Some(WeatherLabel::Rainy));
        assert_eq!(majority_label(Vec::<&WeatherLabel>::new()), None);
    }
}

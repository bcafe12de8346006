//! Forward scan for nearby travel dates with favorable weather

use crate::{WeatherEstimator, WeatherLabel};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 5;

/// Number of days after the base date that are examined
pub const SEARCH_HORIZON_DAYS: u64 = 14;

/// A suggested travel date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateDate {
    pub date: NaiveDate,
    pub weather: WeatherLabel,
    pub symbol: String,
}

/// Suggestions in order of increasing offset from the base date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlternateDates {
    pub suggestions: Vec<AlternateDate>,
    /// How many days after the base date were examined
    pub days_examined: u64,
}

impl AlternateDates {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }
}

/// Bounded linear scan over the days following a base date
#[derive(Debug, Clone, Copy)]
pub struct AlternateDateSearch<'a> {
    estimator: WeatherEstimator<'a>,
    max_suggestions: usize,
    horizon_days: u64,
}

impl<'a> AlternateDateSearch<'a> {
    pub fn new(estimator: WeatherEstimator<'a>) -> Self {
        Self {
            estimator,
            max_suggestions: MAX_SUGGESTIONS,
            horizon_days: SEARCH_HORIZON_DAYS,
        }
    }

    /// Examine base+1, base+2, ... until enough favorable days are found or
    /// the horizon is exhausted. The base date itself is never suggested.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&self, source: &str, destination: &str, base_date: NaiveDate) -> AlternateDates {
        let mut result = AlternateDates::default();

        for offset in 1..=self.horizon_days {
            if result.suggestions.len() >= self.max_suggestions {
                break;
            }
            let Some(date) = base_date.checked_add_days(Days::new(offset)) else {
                break;
            };
            result.days_examined = offset;

            let prediction = self.estimator.estimate(source, destination, date);
            if let Some(label) = prediction.predicted_label().filter(|l| l.is_favorable()) {
                result.suggestions.push(AlternateDate {
                    date,
                    symbol: label.symbol().to_string(),
                    weather: label.clone(),
                });
            }
        }

        debug!(
            found = result.suggestions.len(),
            days_examined = result.days_examined,
            "Alternate date search finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlightRecord, HistoricalDataset};

    fn record(date: &str, weather: WeatherLabel) -> FlightRecord {
        FlightRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_country: "India".to_string(),
            destination_country: "France".to_string(),
            weather,
            cost: 100.0,
            fuel_cost: 10.0,
            airline: "TestAir".to_string(),
            seat_class: "Economy".to_string(),
            passengers: 100,
            flight_name: "TA1".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stops_after_five_favorable_days() {
        let ds = HistoricalDataset::from_records(vec![record("2022-03-10", WeatherLabel::Sunny)]);
        let search = AlternateDateSearch::new(WeatherEstimator::new(&ds));
        let result = search.search("India", "France", date("2024-03-01"));

        assert_eq!(result.len(), MAX_SUGGESTIONS);
        assert_eq!(result.days_examined, 5);
        assert_eq!(result.suggestions[0].date, date("2024-03-02"));
        assert_eq!(result.suggestions[4].date, date("2024-03-06"));
        assert!(result.suggestions.iter().all(|s| s.weather.is_favorable()));
        assert_eq!(result.suggestions[0].symbol, "🌞");
    }

    #[test]
    fn test_scan_crosses_into_favorable_month() {
        // January is rainy, February is clear: only Feb 1..=4 fall inside the horizon
        let ds = HistoricalDataset::from_records(vec![
            record("2023-01-10", WeatherLabel::Rainy),
            record("2023-02-10", WeatherLabel::Clear),
        ]);
        let search = AlternateDateSearch::new(WeatherEstimator::new(&ds));
        let result = search.search("India", "France", date("2024-01-21"));

        assert_eq!(result.days_examined, SEARCH_HORIZON_DAYS);
        let dates: Vec<_> = result.suggestions.iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-02-01"), date("2024-02-02"), date("2024-02-03"), date("2024-02-04")]
        );
    }

    #[test]
    fn test_no_favorable_days_in_horizon() {
        let ds = HistoricalDataset::from_records(vec![record("2023-01-05", WeatherLabel::Snowy)]);
        let search = AlternateDateSearch::new(WeatherEstimator::new(&ds));
        let result = search.search("India", "France", date("2024-01-01"));

        assert!(result.is_empty());
        assert_eq!(result.days_examined, SEARCH_HORIZON_DAYS);
    }

    #[test]
    fn test_unknown_route_yields_nothing() {
        let ds = HistoricalDataset::from_records(vec![record("2023-01-05", WeatherLabel::Clear)]);
        let search = AlternateDateSearch::new(WeatherEstimator::new(&ds));
        let result = search.search("Japan", "Peru", date("2024-01-01"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_base_date_is_never_suggested() {
        let ds = HistoricalDataset::from_records(vec![record("2023-05-05", WeatherLabel::Cloudy)]);
        let search = AlternateDateSearch::new(WeatherEstimator::new(&ds));
        let base = date("2024-05-10");
        let result = search.search("India", "France", base);
        assert!(result.suggestions.iter().all(|s| s.date > base));
    }
}

//! Historical flight table, loaded once from CSV and read-only afterwards

use crate::{FlightRecord, PlannerError, WeatherLabel};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, instrument, warn};

static DATASET: OnceLock<HistoricalDataset> = OnceLock::new();

/// Column names a flight table must carry, matched after trimming
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Date",
    "StartCountry",
    "DestinationCountry",
    "Weather",
    "Cost",
    "FuelCost",
    "Airline",
    "SeatClass",
    "Passenger",
    "FlightName",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Raw CSV row. Every field is optional so that incomplete rows can be
/// dropped instead of failing the whole load.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "StartCountry")]
    start_country: Option<String>,
    #[serde(rename = "DestinationCountry")]
    destination_country: Option<String>,
    #[serde(rename = "Weather")]
    weather: Option<String>,
    #[serde(rename = "Cost")]
    cost: Option<String>,
    #[serde(rename = "FuelCost")]
    fuel_cost: Option<String>,
    #[serde(rename = "Airline")]
    airline: Option<String>,
    #[serde(rename = "SeatClass")]
    seat_class: Option<String>,
    #[serde(rename = "Passenger")]
    passengers: Option<String>,
    #[serde(rename = "FlightName")]
    flight_name: Option<String>,
}

impl RawRow {
    fn into_record(self) -> Option<FlightRecord> {
        Some(FlightRecord {
            date: parse_date(present(&self.date)?)?,
            start_country: present(&self.start_country)?.to_string(),
            destination_country: present(&self.destination_country)?.to_string(),
            weather: WeatherLabel::from(present(&self.weather)?.to_string()),
            cost: parse_amount(present(&self.cost)?)?,
            fuel_cost: parse_amount(present(&self.fuel_cost)?)?,
            airline: present(&self.airline)?.to_string(),
            seat_class: present(&self.seat_class)?.to_string(),
            passengers: parse_count(present(&self.passengers)?)?,
            flight_name: present(&self.flight_name)?.to_string(),
        })
    }
}

/// A field counts as missing when absent or empty; values are not trimmed.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_amount(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }
    // Counts exported from spreadsheets often come through as "3.0"
    let float = value.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float >= 0.0 && float <= u32::MAX as f64 {
        Some(float as u32)
    } else {
        None
    }
}

/// Immutable in-memory table of past flights
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    records: Vec<FlightRecord>,
}

impl HistoricalDataset {
    pub fn from_records(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }

    /// Load the dataset from a CSV file on disk
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load the dataset from any CSV source. Column names are trimmed and
    /// must include every [`REQUIRED_COLUMNS`] entry; rows with a missing
    /// field, a bad date or a bad number are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PlannerError> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Flight data is missing required columns");
            return Err(PlannerError::MissingColumns(missing));
        }

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (line, row) in csv_reader.deserialize::<RawRow>().enumerate() {
            match row.map(RawRow::into_record) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    dropped += 1;
                    debug!(line = line + 2, "Dropping incomplete or unparseable row");
                }
                Err(e) => {
                    dropped += 1;
                    debug!(line = line + 2, error = %e, "Dropping malformed row");
                }
            }
        }

        info!(rows = records.len(), dropped, "Historical dataset loaded");
        Ok(Self { records })
    }

    /// Install this dataset as the process-wide table. Only the first call succeeds.
    pub fn install(self) -> Result<&'static HistoricalDataset, PlannerError> {
        DATASET
            .set(self)
            .map_err(|_| PlannerError::DatasetAlreadyLoaded)?;
        Self::global()
    }

    /// The process-wide table installed at startup
    pub fn global() -> Result<&'static HistoricalDataset, PlannerError> {
        DATASET.get().ok_or(PlannerError::DatasetNotLoaded)
    }

    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows for the exact (source, destination) route, in table order
    pub fn route<'a>(
        &'a self,
        source: &'a str,
        destination: &'a str,
    ) -> impl Iterator<Item = &'a FlightRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.is_route(source, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = " Date , StartCountry,DestinationCountry ,Weather,Cost,FuelCost,Airline,SeatClass,Passenger,FlightName\n";

    fn load(body: &str) -> HistoricalDataset {
        let csv = format!("{}{}", HEADER, body);
        HistoricalDataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let ds = load("2024-06-01,India,France,Clear,500.5,120,AirIndia,Economy,180,AI101\n");
        assert_eq!(ds.len(), 1);
        let record = &ds.records()[0];
        assert_eq!(record.start_country, "India");
        assert_eq!(record.destination_country, "France");
        assert_eq!(record.weather, WeatherLabel::Clear);
        assert_eq!(record.cost, 500.5);
        assert_eq!(record.passengers, 180);
    }

    #[test]
    fn test_bad_rows_are_dropped() {
        let ds = load(concat!(
            "2024-06-01,India,France,Clear,500,120,AirIndia,Economy,180,AI101\n",
            "not-a-date,India,France,Clear,500,120,AirIndia,Economy,180,AI102\n",
            "2024-06-03,India,,Clear,500,120,AirIndia,Economy,180,AI103\n",
            "2024-06-04,India,France,Clear,abc,120,AirIndia,Economy,180,AI104\n",
            "2024-06-05,India,France,Clear,-5,120,AirIndia,Economy,180,AI105\n",
            "2024-06-06,India,France,Rainy,510,121,AirIndia,Economy,175.0,AI106\n",
        ));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].flight_name, "AI106");
        assert_eq!(ds.records()[1].passengers, 175);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();
        assert_eq!(parse_date("2023-03-09"), Some(expected));
        assert_eq!(parse_date("2023-03-09 14:30:00"), Some(expected));
        assert_eq!(parse_date("2023-03-09T14:30:00"), Some(expected));
        assert_eq!(parse_date("2023/03/09"), Some(expected));
        assert_eq!(parse_date("03/09/2023"), Some(expected));
        assert_eq!(parse_date("09-03-2023"), Some(expected));
        assert_eq!(parse_date("March 9th"), None);
    }

    #[test]
    fn test_route_matching_is_exact() {
        let ds = load(concat!(
            "2024-06-01,India,France,Clear,500,120,AirIndia,Economy,180,AI101\n",
            "2024-06-02,india,France,Clear,500,120,AirIndia,Economy,180,AI102\n",
            "2024-06-03,France,India,Clear,500,120,AirIndia,Economy,180,AI103\n",
        ));
        assert_eq!(ds.route("India", "France").count(), 1);
        assert_eq!(ds.route("India ", "France").count(), 0);
    }

    #[test]
    fn test_missing_columns_are_rejected() {
        let err = HistoricalDataset::from_reader("Flight,Price\nAI1,500\nAI2,600\n".as_bytes())
            .unwrap_err();
        match err {
            PlannerError::MissingColumns(missing) => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len());
                assert_eq!(missing[0], "Date");
            }
            other => panic!("expected missing columns, got {:?}", other),
        }

        let partial = "Date,StartCountry,DestinationCountry,Weather,Cost,FuelCost,Airline,SeatClass,FlightName\n";
        match HistoricalDataset::from_reader(partial.as_bytes()) {
            Err(PlannerError::MissingColumns(missing)) => assert_eq!(missing, vec!["Passenger"]),
            other => panic!("expected missing Passenger column, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let ds = load("");
        assert!(ds.is_empty());
    }

    #[test]
    fn test_invalid_utf8_header_is_a_csv_error() {
        let err = HistoricalDataset::from_reader(&b"Date,\xff\xfe\n"[..]).unwrap_err();
        assert!(matches!(err, PlannerError::CsvError(_)));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-1"), None);
    }
}

//! Aggregate statistics over the full historical dataset

use crate::{FlightRecord, HistoricalDataset, WeatherLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOP_DESTINATIONS: usize = 10;
pub const TOP_FLIGHTS: usize = 10;

/// One group of a grouped aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub key: String,
    pub value: f64,
    /// Number of dataset rows in the group
    pub count: usize,
}

/// The columns shown in the most-expensive-flights table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub flight_name: String,
    pub airline: String,
    pub start_country: String,
    pub destination_country: String,
    pub cost: f64,
}

impl From<&FlightRecord> for FlightSummary {
    fn from(record: &FlightRecord) -> Self {
        Self {
            flight_name: record.flight_name.clone(),
            airline: record.airline.clone(),
            start_country: record.start_country.clone(),
            destination_country: record.destination_country.clone(),
            cost: record.cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCount {
    pub weather: WeatherLabel,
    pub count: usize,
    pub symbol: String,
}

/// Everything the analytics view displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_flights: usize,
    pub avg_cost_by_airline: Vec<GroupStat>,
    pub avg_fuel_cost_by_seat_class: Vec<GroupStat>,
    pub passengers_by_destination: Vec<GroupStat>,
    pub top_expensive_flights: Vec<FlightSummary>,
    pub weather_distribution: Vec<WeatherCount>,
}

#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    dataset: &'a HistoricalDataset,
}

impl<'a> Analytics<'a> {
    pub fn new(dataset: &'a HistoricalDataset) -> Self {
        Self { dataset }
    }

    pub fn report(&self) -> AnalyticsReport {
        AnalyticsReport {
            total_flights: self.dataset.len(),
            avg_cost_by_airline: self.avg_cost_by_airline(),
            avg_fuel_cost_by_seat_class: self.avg_fuel_cost_by_seat_class(),
            passengers_by_destination: self.top_destinations_by_passengers(TOP_DESTINATIONS),
            top_expensive_flights: self.top_expensive_flights(TOP_FLIGHTS),
            weather_distribution: self.weather_distribution(),
        }
    }

    /// Mean cost per airline, cheapest first
    pub fn avg_cost_by_airline(&self) -> Vec<GroupStat> {
        let mut groups = self.group_mean(|r| &r.airline, |r| r.cost);
        groups.sort_by(|a, b| a.value.total_cmp(&b.value));
        groups
    }

    /// Mean fuel cost per seat class, cheapest first
    pub fn avg_fuel_cost_by_seat_class(&self) -> Vec<GroupStat> {
        let mut groups = self.group_mean(|r| &r.seat_class, |r| r.fuel_cost);
        groups.sort_by(|a, b| a.value.total_cmp(&b.value));
        groups
    }

    /// Total passengers for every destination, busiest first
    pub fn passengers_by_destination(&self) -> Vec<GroupStat> {
        let mut groups = self.group_fold(|r| &r.destination_country, |sum, r| sum + r.passengers as f64);
        groups.sort_by(|a, b| b.value.total_cmp(&a.value));
        groups
    }

    pub fn top_destinations_by_passengers(&self, limit: usize) -> Vec<GroupStat> {
        let mut groups = self.passengers_by_destination();
        groups.truncate(limit);
        groups
    }

    /// The `limit` most expensive individual flights, most expensive first
    pub fn top_expensive_flights(&self, limit: usize) -> Vec<FlightSummary> {
        let mut records: Vec<&FlightRecord> = self.dataset.records().iter().collect();
        records.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        records.into_iter().take(limit).map(FlightSummary::from).collect()
    }

    /// Row count per weather label, most common first
    pub fn weather_distribution(&self) -> Vec<WeatherCount> {
        let mut counts: BTreeMap<&WeatherLabel, usize> = BTreeMap::new();
        for record in self.dataset.records() {
            *counts.entry(&record.weather).or_default() += 1;
        }

        let mut distribution: Vec<WeatherCount> = counts
            .into_iter()
            .map(|(weather, count)| WeatherCount {
                symbol: weather.symbol().to_string(),
                weather: weather.clone(),
                count,
            })
            .collect();
        distribution.sort_by(|a, b| b.count.cmp(&a.count));
        distribution
    }

    fn group_mean<K, V>(&self, key: K, value: V) -> Vec<GroupStat>
    where
        K: Fn(&FlightRecord) -> &String,
        V: Fn(&FlightRecord) -> f64,
    {
        let mut groups = self.group_fold(key, |sum, r| sum + value(r));
        for group in &mut groups {
            group.value /= group.count as f64;
        }
        groups
    }

    /// Groups in key order; each row lands in exactly one group
    fn group_fold<K, F>(&self, key: K, fold: F) -> Vec<GroupStat>
    where
        K: Fn(&FlightRecord) -> &String,
        F: Fn(f64, &FlightRecord) -> f64,
    {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for record in self.dataset.records() {
            let entry = groups.entry(key(record).as_str()).or_insert((0.0, 0));
            entry.0 = fold(entry.0, record);
            entry.1 += 1;
        }

        groups
            .into_iter()
            .map(|(key, (value, count))| GroupStat {
                key: key.to_string(),
                value,
                count,
            })
            .collect()
    }
}

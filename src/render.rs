//! Terminal rendering of the Home, Analytics and About views

use crate::{
    AlternateDates, AnalyticsReport, AttractionLookup, CostPrediction, GroupStat, TripPlan,
    WeatherCount,
};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Row, Table};
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

/// Status banner kinds, mirroring the colored boxes of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Success,
    Error,
    Info,
    Warning,
}

impl Banner {
    pub fn render(self, message: &str) -> String {
        let tag = match self {
            Banner::Success => "[SUCCESS]".green().bold(),
            Banner::Error => "[ERROR]".red().bold(),
            Banner::Info => "[INFO]".blue().bold(),
            Banner::Warning => "[WARNING]".yellow().bold(),
        };
        format!("{} {}\n", tag, message)
    }
}

fn table(header: impl Into<Row>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

/// Horizontal bar chart, bars scaled to the largest value
pub fn bar_chart(key_header: &str, groups: &[GroupStat]) -> String {
    let max = groups.iter().map(|g| g.value).fold(0.0, f64::max);

    let mut chart = table(vec![key_header, "", "Value"]);
    for group in groups {
        let len = if max > 0.0 {
            ((group.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        chart.add_row(vec![
            group.key.clone(),
            "█".repeat(len),
            format!("{:.2}", group.value),
        ]);
    }
    format!("{}\n", chart)
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n### {}", title);
}

/// The results of a "Predict" action
pub fn render_plan(plan: &TripPlan) -> String {
    let mut out = String::new();

    match plan.cost {
        CostPrediction::Predicted { amount } => {
            out.push_str(&Banner::Success.render(&format!("Predicted Flight Cost: ₹{:.2}", amount)));
            let _ = writeln!(out, "📈 {}", plan.cost.note());
        }
        _ => {
            out.push_str(&Banner::Error.render(plan.cost.note()));
            return out;
        }
    }

    out.push_str(&Banner::Info.render(&format!(
        "Predicted Weather: {} {}",
        plan.weather.label(),
        plan.weather.predicted_label().map_or("🌍", |l| l.symbol())
    )));
    out.push_str(&Banner::Warning.render(&plan.weather.note()));

    if let Some(alternates) = &plan.alternates {
        out.push_str(&render_alternates(alternates));
    }

    if let Some(attractions) = &plan.attractions {
        heading(&mut out, "🗺️ Top Tourist Attractions");
        out.push_str(&render_attractions(attractions));
    }

    out
}

pub fn render_alternates(alternates: &AlternateDates) -> String {
    if alternates.is_empty() {
        return Banner::Warning.render("⚠️ No favorable alternate dates found in the next 14 days.");
    }

    let mut out = String::new();
    heading(&mut out, "✅ Alternate Travel Dates with Favorable Weather");
    let mut dates = table(vec!["Date", "Weather", "Emoji"]);
    for s in &alternates.suggestions {
        dates.add_row(vec![
            s.date.format("%Y-%m-%d").to_string(),
            s.weather.to_string(),
            s.symbol.clone(),
        ]);
    }
    let _ = writeln!(out, "{}", dates);
    out
}

pub fn render_attractions(lookup: &AttractionLookup) -> String {
    match lookup {
        AttractionLookup::Found { attractions } => {
            let mut places = table(vec!["Name", "Address", "Rating"]);
            for a in attractions {
                places.add_row(vec![a.name.clone(), a.address.clone(), a.rating_display()]);
            }
            let mut out = format!("{}\n", places);
            out.push_str("\nMap:\n");
            for a in attractions {
                let _ = writeln!(out, "  📍 {} ({:.5}, {:.5})", a.name, a.latitude, a.longitude);
            }
            out
        }
        AttractionLookup::Empty => Banner::Info.render("No tourist data found."),
        AttractionLookup::Unavailable { reason } => {
            Banner::Error.render(&format!("Tourist attractions are unavailable right now: {}", reason))
        }
    }
}

/// Weather label frequencies shown at the bottom of the Home view
pub fn render_weather_stats(distribution: &[WeatherCount]) -> String {
    let mut out = String::new();
    heading(&mut out, "📋 Weather Stats in Dataset");
    let mut stats = table(vec!["Weather", "Count", "Emoji"]);
    for w in distribution {
        stats.add_row(vec![w.weather.to_string(), w.count.to_string(), w.symbol.clone()]);
    }
    let _ = writeln!(out, "{}", stats);
    out
}

pub fn render_analytics(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Analytics Dashboard ({} flights)", report.total_flights);

    heading(&mut out, "✈️ Average Flight Cost by Airline");
    out.push_str(&bar_chart("Airline", &report.avg_cost_by_airline));

    heading(&mut out, "💺 Fuel Cost Comparison by Seat Class");
    out.push_str(&bar_chart("SeatClass", &report.avg_fuel_cost_by_seat_class));

    heading(&mut out, "🌍 Passenger Distribution by Destination");
    let mut destinations = table(vec!["DestinationCountry", "Passenger"]);
    for g in &report.passengers_by_destination {
        destinations.add_row(vec![g.key.clone(), format!("{:.0}", g.value)]);
    }
    let _ = writeln!(out, "{}", destinations);

    heading(&mut out, "💰 Top 10 Expensive Flights");
    let mut flights = table(vec!["FlightName", "Airline", "StartCountry", "DestinationCountry", "Cost"]);
    for f in &report.top_expensive_flights {
        flights.add_row(vec![
            f.flight_name.clone(),
            f.airline.clone(),
            f.start_country.clone(),
            f.destination_country.clone(),
            format!("{:.2}", f.cost),
        ]);
    }
    let _ = writeln!(out, "{}", flights);
    out
}

pub fn render_about() -> &'static str {
    "ℹ️ About the Project

Smart Travel Planner helps travelers plan better by:
- Predicting flight cost using historical data
- Predicting weather conditions based on seasonal trends
- Suggesting alternate travel dates with better weather
- Showing top tourist attractions using the Google Places API
- Visualizing popular airlines, costs, and destinations
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlternateDate, Attraction, TripQuery, WeatherLabel, WeatherPrediction};
    use chrono::NaiveDate;

    fn query() -> TripQuery {
        TripQuery::new("India", "France", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn test_table_aligns_wide_glyphs() {
        let mut names = table(vec!["Name", "Rating"]);
        names.add_row(vec!["東京タワー", "4.5"]);
        names.add_row(vec!["Louvre Museum", "4.7"]);
        let rendered = names.to_string();

        let tokyo = rendered.lines().find(|l| l.contains("東京タワー")).unwrap();
        let louvre = rendered.lines().find(|l| l.contains("Louvre Museum")).unwrap();
        // Each of the five CJK glyphs occupies two terminal columns
        assert_eq!(louvre.chars().count(), tokyo.chars().count() + 5);
        assert_eq!(
            tokyo.find("4.5").map(|i| tokyo[..i].chars().count() + 5),
            louvre.find("4.7").map(|i| louvre[..i].chars().count())
        );
    }

    #[test]
    fn test_banners_keep_their_tags() {
        assert!(Banner::Success.render("ok").contains("[SUCCESS]"));
        assert!(Banner::Error.render("bad").contains("[ERROR]"));
        assert!(Banner::Info.render("fyi").contains("[INFO]"));
        let warning = Banner::Warning.render("careful");
        assert!(warning.contains("[WARNING]"));
        assert!(warning.ends_with("careful\n"));
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let groups = vec![
            GroupStat { key: "a".to_string(), value: 50.0, count: 1 },
            GroupStat { key: "b".to_string(), value: 100.0, count: 1 },
        ];
        let chart = bar_chart("Key", &groups);
        let half = chart.lines().find(|l| l.contains("50.00")).unwrap();
        let full = chart.lines().find(|l| l.contains("100.00")).unwrap();
        assert_eq!(half.matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(full.matches('█').count(), BAR_WIDTH);
    }

    #[test]
    fn test_plan_without_cost_only_shows_error() {
        let plan = TripPlan {
            query: query(),
            cost: CostPrediction::NoData,
            weather: WeatherPrediction::Predicted { label: WeatherLabel::Clear },
            alternates: None,
            attractions: None,
        };
        let out = render_plan(&plan);
        assert!(out.contains("[ERROR]"));
        assert!(out.contains("Not enough data to predict cost."));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_full_plan() {
        let plan = TripPlan {
            query: query(),
            cost: CostPrediction::Predicted { amount: 4321.5 },
            weather: WeatherPrediction::Predicted { label: WeatherLabel::Rainy },
            alternates: Some(AlternateDates {
                suggestions: vec![AlternateDate {
                    date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                    weather: WeatherLabel::Sunny,
                    symbol: "🌞".to_string(),
                }],
                days_examined: 14,
            }),
            attractions: Some(AttractionLookup::Found {
                attractions: vec![Attraction {
                    name: "Eiffel Tower".to_string(),
                    address: "Champ de Mars, Paris".to_string(),
                    rating: Some(4.7),
                    latitude: 48.8584,
                    longitude: 2.2945,
                }],
            }),
        };
        let out = render_plan(&plan);
        assert!(out.contains("Predicted Flight Cost: ₹4321.50"));
        assert!(out.contains("Predicted Weather: Rainy 🌧️"));
        assert!(out.contains("Unfavorable weather. Try alternate date."));
        assert!(out.contains("2024-06-03"));
        assert!(out.contains("Eiffel Tower"));
        assert!(out.contains("4.7"));
    }

    #[test]
    fn test_empty_states() {
        assert!(render_alternates(&AlternateDates::default()).contains("No favorable alternate dates"));
        assert!(render_attractions(&AttractionLookup::Empty).contains("No tourist data found."));
        let unavailable = AttractionLookup::Unavailable { reason: "timeout".to_string() };
        let out = render_attractions(&unavailable);
        assert!(out.contains("[ERROR]"));
        assert!(out.contains("timeout"));
    }
}

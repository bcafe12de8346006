//! CLI interface for travel-planner

use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use travel_planner::{
    config::DEFAULT_DATASET_PATH,
    logging::{init_logging, LogTarget},
    parse_travel_date, render, Analytics, HistoricalDataset, PlacesClient, PlannerConfig,
    TripPlanner, TripQuery,
};

#[derive(Parser)]
#[command(name = "travel-planner")]
#[command(about = "Plan your trip smarter with weather, cost prediction, and tourism insights")]
#[command(version)]
pub struct Cli {
    /// Historical flight data (CSV)
    #[arg(long, global = true, default_value = DEFAULT_DATASET_PATH)]
    pub data: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict cost and weather for a trip and suggest alternatives
    Home {
        /// Source country
        #[arg(short, long)]
        from: String,
        /// Destination country
        #[arg(short, long)]
        to: String,
        /// Travel date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Aggregate statistics over the whole dataset
    Analytics {
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// What this tool does
    About,
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    println!("Results saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::About = cli.command {
        print!("{}", render::render_about());
        return Ok(());
    }

    let config = PlannerConfig::from_env()?.with_dataset_path(cli.data);
    if let Err(e) = init_logging(LogTarget::Stderr, &config.log_dir, cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let dataset = match HistoricalDataset::from_path(&config.dataset_path) {
        Ok(dataset) => dataset.install()?,
        Err(e) => {
            eprintln!(
                "Error loading flight data from {}: {}",
                config.dataset_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    if dataset.is_empty() {
        eprintln!(
            "Warning: {} contains no usable flights; predictions will report missing data",
            config.dataset_path.display()
        );
    }

    match cli.command {
        Commands::Home { from, to, date, output } => {
            let date = match date {
                Some(date) => parse_travel_date(&date)?,
                None => Local::now().date_naive(),
            };
            let query = TripQuery::new(from, to, date);

            println!("📅 Plan Your Trip: {} → {} on {}", query.source, query.destination, query.date);
            let planner = TripPlanner::new(dataset, PlacesClient::from_config(&config)?);
            match planner.plan(&query).await {
                Ok(plan) => {
                    print!("{}", render::render_plan(&plan));
                    if let Some(output_file) = output {
                        write_json(&output_file, &plan)?;
                    }
                }
                Err(e) => {
                    eprintln!("Error planning trip: {}", e);
                    std::process::exit(1);
                }
            }

            print!("{}", render::render_weather_stats(&Analytics::new(dataset).weather_distribution()));
        }
        Commands::Analytics { output } => {
            let report = Analytics::new(dataset).report();
            print!("{}", render::render_analytics(&report));
            if let Some(output_file) = output {
                write_json(&output_file, &report)?;
            }
        }
        Commands::About => unreachable!("handled before loading the dataset"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(&[
            "travel-planner",
            "home",
            "--from", "India",
            "--to", "France",
            "--date", "2024-06-15",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli { command: Commands::Home { from, to, date, .. }, data, .. }) = cli {
            assert_eq!(from, "India");
            assert_eq!(to, "France");
            assert_eq!(date.as_deref(), Some("2024-06-15"));
            assert_eq!(data, PathBuf::from(DEFAULT_DATASET_PATH));
        }
    }

    #[test]
    fn test_global_data_flag() {
        let cli = Cli::try_parse_from(&["travel-planner", "analytics", "--data", "fares.csv", "-v"]).unwrap();
        assert_eq!(cli.data, PathBuf::from("fares.csv"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Analytics { output: None }));
    }

    #[test]
    fn test_home_requires_route() {
        assert!(Cli::try_parse_from(&["travel-planner", "home", "--from", "India"]).is_err());
    }
}

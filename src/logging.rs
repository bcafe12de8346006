//! Tracing subscriber setup shared by both binaries

use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Compact human readable lines on stderr
    Stderr,
    /// Structured JSON in a daily rolling file. Stdout stays free, which
    /// the MCP stdio transport requires.
    File,
}

/// Default filter when RUST_LOG is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "travel_planner=debug,reqwest=info"
    } else {
        "travel_planner=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Initialize logging for a binary
pub fn init_logging(target: LogTarget, log_dir: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact(),
                )
                .try_init()?;
        }
        LogTarget::File => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = tracing_appender::rolling::daily(log_dir, "travel-planner-mcp.log");

            tracing_subscriber::registry()
                .with(env_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()?;

            info!(log_dir = %log_dir.display(), "Logging initialized - logs will be written to travel-planner-mcp.log.*");
        }
    }

    debug!("Debug logging is enabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            for directive in default_directive(verbose).split(',') {
                assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
            }
        }
    }
}

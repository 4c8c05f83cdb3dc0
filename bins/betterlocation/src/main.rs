//! betterlocation - find coordinates in text
//!
//! Recognizes coordinates and map links in free text and prints them in
//! every notation the engine supports.

mod output;

use anyhow::{Context, Result};
use betterlocation_core::cache::CacheConfig;
use betterlocation_core::config::Config;
use betterlocation_core::error::exit_codes;
use betterlocation_geo::Coordinate;
use betterlocation_services::{
    CachedFetcher, Deduplication, DisabledFetcher, Entry, JsonFetcher, Registry, Scanner, Service,
    Tag,
};
use betterlocation_telemetry::{metrics, TelemetryConfig};
use clap::{Parser, Subcommand};
use output::Status;
use std::io::{IsTerminal, Read};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "betterlocation")]
#[command(about = "Find coordinates and map links in text")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .betterlocation.toml if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan text for coordinates (reads stdin when no text is given)
    Scan {
        /// Text to scan
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Keep entries that resolve to the same coordinate
        #[arg(long)]
        keep_duplicates: bool,

        /// Run recognizers one after another
        #[arg(long)]
        sequential: bool,

        /// Print scan metrics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// List the supported formats
    Services {
        /// Only services with this tag (e.g. share-link)
        #[arg(long)]
        tag: Option<Tag>,
    },

    /// Render a coordinate in every supported format
    Convert {
        /// Latitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check input against one format
    Validate {
        /// Numeric service ID (see `services`)
        service_id: u16,

        /// Input to check
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let telemetry = TelemetryConfig {
        log_level: if cli.verbose {
            "debug".to_string()
        } else {
            config.schema.logging.level.clone()
        },
        json: config.schema.logging.json,
        ..TelemetryConfig::default()
    };
    betterlocation_telemetry::init_with_config(&telemetry)?;
    tracing::debug!(path = ?config.path, "Configuration loaded");

    // Remote lookups need a transport supplied by the embedding application
    let fetcher: Arc<dyn JsonFetcher> = Arc::new(CachedFetcher::new(
        DisabledFetcher,
        CacheConfig::from(&config.schema.cache),
    ));
    let registry = Registry::standard(&config.schema, fetcher).context("Invalid service registry")?;

    let code = match cli.command {
        Commands::Scan {
            text,
            json,
            keep_duplicates,
            sequential,
            stats,
        } => {
            let mut scanner = Scanner::from_config(registry, &config.schema.scan);
            if keep_duplicates {
                scanner = scanner.with_deduplication(Deduplication::Disabled);
            }
            if sequential {
                scanner = scanner.with_parallel(false);
            }
            run_scan(&scanner, &text, json, stats)?
        }
        Commands::Services { tag } => run_services(&registry, tag),
        Commands::Convert { lat, lon, json } => run_convert(&registry, lat, lon, json)?,
        Commands::Validate { service_id, input } => run_validate(&registry, service_id, &input),
    };

    std::process::exit(code);
}

fn read_input(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Reading text from stdin, end with Ctrl-D");
    }
    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

fn run_scan(scanner: &Scanner, args: &[String], json: bool, stats: bool) -> Result<i32> {
    let text = read_input(args)?;
    let collection = scanner.scan(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&collection)?);
    } else {
        for entry in collection.entries() {
            match entry {
                Entry::Location { location, .. } => Status::success(&output::location_line(location)),
                Entry::Error(error) => Status::warning(&output::error_line(error)),
            }
        }
        if collection.is_empty() {
            Status::error("No coordinates found");
        } else {
            println!(
                "\n{}",
                output::format_count(collection.len(), "location", "locations")
            );
        }
    }

    if stats {
        eprintln!("{}", serde_json::to_string_pretty(&metrics().export_json())?);
    }

    Ok(if collection.is_empty() {
        exit_codes::NO_MATCH
    } else {
        exit_codes::SUCCESS
    })
}

fn run_services(registry: &Registry, tag: Option<Tag>) -> i32 {
    let services: Vec<&dyn Service> = match tag {
        Some(tag) => registry.with_tag(tag).collect(),
        None => registry.services().collect(),
    };
    if services.is_empty() {
        Status::error("No service matches");
        return exit_codes::NO_MATCH;
    }
    for service in services {
        println!("{}", output::service_row(service));
    }
    exit_codes::SUCCESS
}

fn run_convert(registry: &Registry, lat: f64, lon: f64, json: bool) -> Result<i32> {
    let coordinate = match Coordinate::new(lat, lon) {
        Ok(coordinate) => coordinate,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::INVALID_INPUT);
        }
    };

    let rendered: Vec<(&dyn Service, [(&str, _); 4])> = registry
        .services()
        .map(|service| {
            (
                service,
                [
                    ("share text", service.share_text(&coordinate)),
                    ("share link", service.share_link(&coordinate)),
                    ("drive link", service.drive_link(&coordinate)),
                    ("static image", service.static_image_link(&coordinate)),
                ],
            )
        })
        .collect();

    if json {
        let report: serde_json::Map<String, serde_json::Value> = rendered
            .iter()
            .map(|(service, operations)| {
                let values: serde_json::Map<String, serde_json::Value> = operations
                    .iter()
                    .map(|(name, result)| {
                        let value = match result {
                            Ok(value) => serde_json::json!({ "value": value }),
                            Err(e) => serde_json::json!({ "kind": e.kind(), "message": e.to_string() }),
                        };
                        ((*name).to_string(), value)
                    })
                    .collect();
                (service.name().to_string(), values.into())
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_codes::SUCCESS);
    }

    println!("{}", coordinate.key());
    for (service, operations) in &rendered {
        Status::header(service.name());
        for (name, result) in operations {
            println!("  {:<13} {}", name, output::operation_result(result));
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn run_validate(registry: &Registry, service_id: u16, input: &str) -> i32 {
    let service = match registry.get(service_id) {
        Ok(service) => service,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::INVALID_INPUT;
        }
    };

    if !service.validate(input) {
        Status::error(&format!("Not a valid {} input", service.name()));
        return exit_codes::INVALID_INPUT;
    }

    match service.process(input) {
        Ok(location) => {
            Status::success(&output::location_line(&location));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("{} ({:?})", e, e.kind()));
            exit_codes::FAILURE
        }
    }
}

//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use betterlocation_services::{BetterLocation, ErrorKind, ScanError, Service, ServiceError};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// One line per resolved location: key, provenance and source text.
pub fn location_line(location: &BetterLocation) -> String {
    let mut line = format!("{}  {}", location.key().bold(), location.source_name().cyan());
    if let Some(sub_type) = location.sub_type() {
        line.push_str(&format!(" ({sub_type})"));
    }
    if let Some(prefix) = location.prefix() {
        line.push_str(&format!("  {prefix}"));
    }
    for description in location.descriptions() {
        line.push_str(&format!("  \"{description}\""));
    }
    line.push_str(&format!("  {}", location.input().dimmed()));
    line
}

/// One line per unresolved match.
pub fn error_line(error: &ScanError) -> String {
    format!(
        "{}  {}: {}",
        error.raw_text().bold(),
        error.source_name().cyan(),
        error.error()
    )
}

/// Result of one optional operation, styled by outcome.
pub fn operation_result(result: &Result<String, ServiceError>) -> String {
    match result {
        Ok(value) => value.clone(),
        Err(e) => match e.kind() {
            ErrorKind::UnsupportedOperation => "not supported".dimmed().to_string(),
            ErrorKind::NotImplemented => "not implemented yet".yellow().to_string(),
            _ => e.to_string().yellow().to_string(),
        },
    }
}

/// `ID  Name  tags` row for the service listing.
pub fn service_row(service: &dyn Service) -> String {
    let tags: Vec<&str> = service.tags().iter().map(|tag| tag.as_str()).collect();
    format!(
        "{:>3}  {:<14} {}",
        service.id(),
        service.name(),
        tags.join(", ").dimmed()
    )
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betterlocation_geo::Coordinate;
    use betterlocation_services::{Operation, ServiceId};

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "location", "locations"), "1 location");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(0, "location", "locations"), "0 locations");
    }

    #[test]
    fn test_operation_result_value() {
        assert_eq!(operation_result(&Ok("JO70fc".to_string())), "JO70fc");
    }

    #[test]
    fn test_operation_result_unsupported() {
        let err = ServiceError::NotSupported {
            service: "WGS84",
            operation: Operation::DriveLink,
        };
        assert!(operation_result(&Err(err)).contains("not supported"));
    }

    #[test]
    fn test_location_line() {
        let coordinate = Coordinate::new(50.087451, 14.420671).unwrap();
        let location = BetterLocation::new(coordinate, ServiceId::WAZE, "Waze", "waze.com/ul?ll=50.087451,14.420671")
            .with_sub_type("Map center");
        let line = location_line(&location);
        assert!(line.contains("50.087451,14.420671"));
        assert!(line.contains("(Map center)"));
    }
}

//! Output formatting for voc (table, json)

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and key/value lists (default)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a section heading; table mode only
    pub fn heading(&self, msg: &str) {
        if !self.quiet && !self.is_json() {
            println!("{}", msg.bold());
        }
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
                Ok(())
            }
            OutputFormat::Json => self.print_json(data),
        }
    }

    /// Print key-value pairs
    pub fn print_kv(&self, pairs: &[(&str, String)]) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in pairs {
                    let label = format!("{:width$}", format!("{}:", key), width = width + 1);
                    println!("{}  {}", label.bold(), value);
                }
                Ok(())
            }
            OutputFormat::Json => {
                let map: serde_json::Map<String, Value> = pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                    .collect();
                self.print_json(&map)
            }
        }
    }

    /// Spinner shown while a command is polled; hidden in quiet or JSON mode
    pub fn spinner(&self, msg: String) -> Result<ProgressBar> {
        if self.quiet || self.is_json() {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})")?);
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(120));
        Ok(pb)
    }
}

// =============================================================================
// Field Selection
// =============================================================================

/// Look up a dotted path (`doors.hoodOpen`, `bulbFailures.0`) in a JSON value
pub fn select_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Render a JSON value for display; strings without quotes
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten the top level of a JSON object into name/value rows
pub fn object_rows(value: &Value) -> Vec<FieldRow> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| FieldRow {
                name: name.clone(),
                value: display_value(value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Google Maps link for a coordinate pair
pub fn maps_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.google.com/maps/place/{:.15},{:.15}",
        latitude, longitude
    )
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Name/value display for attributes and status
#[derive(Debug, Tabled, Serialize)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Vehicle display for cars command
#[derive(Debug, Tabled, Serialize)]
pub struct VehicleRow {
    #[tabled(rename = "VIN")]
    pub vin: String,
    #[tabled(rename = "Registration")]
    pub registration: String,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Year")]
    pub model_year: String,
}

/// Trip leg display for trips command
#[derive(Debug, Tabled, Serialize)]
pub struct TripRow {
    #[tabled(rename = "Trip")]
    pub trip: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Start")]
    pub start_time: String,
    #[tabled(rename = "End")]
    pub end_time: String,
    #[tabled(rename = "Distance")]
    pub distance: String,
    #[tabled(rename = "Fuel")]
    pub fuel: String,
    #[tabled(rename = "Energy")]
    pub energy: String,
    #[tabled(rename = "Odometer")]
    pub odometer: String,
}

/// Charging location display for charging list command
#[derive(Debug, Tabled, Serialize)]
pub struct ChargingLocationRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Delay Charging")]
    pub delay: String,
    #[tabled(rename = "At Location")]
    pub at_location: String,
    #[tabled(rename = "Address")]
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_select_field() {
        let status = json!({
            "carLocked": true,
            "doors": { "hoodOpen": false },
            "bulbFailures": ["FRONT_LEFT"]
        });
        assert_eq!(select_field(&status, "carLocked"), Some(&json!(true)));
        assert_eq!(select_field(&status, "doors.hoodOpen"), Some(&json!(false)));
        assert_eq!(
            select_field(&status, "bulbFailures.0"),
            Some(&json!("FRONT_LEFT"))
        );
        assert_eq!(select_field(&status, "doors.missing"), None);
        assert_eq!(select_field(&status, "carLocked.deeper"), None);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("ABC123")), "ABC123");
        assert_eq!(display_value(&json!(90)), "90");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(["a"])), r#"["a"]"#);
    }

    #[test]
    fn test_object_rows() {
        let rows = object_rows(&json!({ "lockSupported": true, "registrationNumber": "ABC123" }));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "lockSupported");
        assert_eq!(rows[0].value, "true");
        assert!(object_rows(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_maps_url() {
        assert_eq!(
            maps_url(57.5, 11.25),
            "https://www.google.com/maps/place/57.500000000000000,11.250000000000000"
        );
    }
}

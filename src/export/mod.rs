//! Export of the log collection to portable documents.
//!
//! Supports JSON for machine consumption and CSV for spreadsheet
//! analysis. An empty collection exports as a valid empty document,
//! never an error.

use crate::core::{LogEntry, Result, WirelogError};
use std::io::Write;
use std::path::Path;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    Json,
    /// CSV with a header row
    Csv,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// Log collection exporter.
pub struct LogExporter;

impl LogExporter {
    /// Serialize an ordered collection into a self-contained document.
    pub fn export(entries: &[LogEntry], format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Self::export_json(entries),
            ExportFormat::Csv => Ok(Self::export_csv(entries)),
        }
    }

    /// Suggested filename carrying the generation timestamp.
    pub fn suggested_filename(format: ExportFormat, at: chrono::DateTime<chrono::Utc>) -> String {
        format!(
            "wirelog-export-{}.{}",
            at.format("%Y%m%d-%H%M%S"),
            format.extension()
        )
    }

    fn export_json(entries: &[LogEntry]) -> Result<String> {
        serde_json::to_string_pretty(entries).map_err(WirelogError::from)
    }

    fn export_csv(entries: &[LogEntry]) -> String {
        let mut csv_output = String::new();
        csv_output.push_str("domain,url,method,status_code,error,latency_ms,timestamp\n");
        for entry in entries {
            csv_output.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                csv_field(&entry.domain),
                csv_field(&entry.url),
                csv_field(&entry.method),
                entry.status_code.map(|c| c.to_string()).unwrap_or_default(),
                csv_field(entry.error_reason.as_deref().unwrap_or("")),
                entry.latency_ms,
                entry.observed_at,
            ));
        }
        csv_output
    }

    /// Write an exported document to a file, or stdout when no path is
    /// given.
    pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => {
                let mut file = std::fs::File::create(path).map_err(|e| {
                    WirelogError::export(format!("Failed to create {}: {}", path.display(), e))
                })?;
                file.write_all(content.as_bytes()).map_err(|e| {
                    WirelogError::export(format!("Failed to write {}: {}", path.display(), e))
                })?;
                Ok(())
            },
            None => {
                print!("{}", content);
                Ok(())
            },
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(|c| c == ',' || c == '"' || c == '\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RequestOutcome;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn entries() -> Vec<LogEntry> {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        vec![
            LogEntry::from_outcome(
                "https://api.example.com/v1/users?page=1,2".to_string(),
                "GET".to_string(),
                RequestOutcome::Completed { status_code: 200 },
                120,
                at,
            ),
            LogEntry::from_outcome(
                "https://payments.example.org/charge".to_string(),
                "POST".to_string(),
                RequestOutcome::Failed {
                    error_reason: "net::ERR_TIMED_OUT".to_string(),
                },
                900,
                at,
            ),
        ]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("yaml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_empty_collection_is_valid_json() {
        let doc = LogExporter::export(&[], ExportFormat::Json).unwrap();
        assert_eq!(doc, "[]");
        let parsed: Vec<LogEntry> = serde_json::from_str(&doc).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let entries = entries();
        let doc = LogExporter::export(&entries, ExportFormat::Json).unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_csv_has_header_and_quoting() {
        let doc = LogExporter::export(&entries(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "domain,url,method,status_code,error,latency_ms,timestamp");
        // The comma inside the URL forces quoting.
        assert!(lines[1].contains("\"https://api.example.com/v1/users?page=1,2\""));
        assert!(lines[2].contains("net::ERR_TIMED_OUT"));
    }

    #[test]
    fn test_empty_csv_is_header_only() {
        let doc = LogExporter::export(&[], ExportFormat::Csv).unwrap();
        assert_eq!(doc.lines().count(), 1);
    }

    #[test]
    fn test_suggested_filename_carries_timestamp() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        assert_eq!(
            LogExporter::suggested_filename(ExportFormat::Json, at),
            "wirelog-export-20240501-123005.json"
        );
        assert_eq!(
            LogExporter::suggested_filename(ExportFormat::Csv, at),
            "wirelog-export-20240501-123005.csv"
        );
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        LogExporter::write_output("[]", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}

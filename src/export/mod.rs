//! Export functionality for catalog query results.
//!
//! This module renders results in two formats: JSON for machines and
//! Markdown for documentation and CI logs. Exporters only format; every
//! value is computed by the engine beforehand.

pub mod json;
pub mod markdown;

use serde::Serialize;
use std::io::{self, Write};

use crate::graph::{AncestorEntry, GraphView, TreeNode};
use crate::model::License;
use crate::promotion::PromotionReport;
use crate::report::DependencyReport;

/// Export format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    #[default]
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// A query result ready to be exported.
///
/// Serializes as the wrapped value itself.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExportData {
    Ancestors {
        subject: String,
        ancestors: Vec<AncestorEntry>,
    },
    Graph(GraphView),
    Tree(TreeNode),
    Promotion(PromotionReport),
    Promotable {
        module: String,
        can_be_promoted: bool,
    },
    Dependencies(DependencyReport),
    Versions {
        artifact: String,
        versions: Vec<String>,
        latest: Option<String>,
    },
    Latest {
        artifact: String,
        latest: Option<String>,
    },
    Licenses {
        subject: String,
        licenses: Vec<License>,
    },
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert_eq!(
            "md".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Markdown), "markdown");
    }

    #[test]
    fn test_export_to_string_dispatches() {
        let data = ExportData::Promotable {
            module: "a:1.0".to_string(),
            can_be_promoted: true,
        };
        let json = export_to_string(ExportFormat::Json, &data).unwrap();
        assert!(json.contains("\"can_be_promoted\": true"));

        let markdown = export_to_string(ExportFormat::Markdown, &data).unwrap();
        assert!(markdown.contains("a:1.0"));
    }
}

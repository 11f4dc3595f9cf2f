//! Result types produced by a summary run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The downloadable formats a summary can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raw summary bytes, `text/plain`.
    Text,
    /// Paginated document, `application/pdf`.
    Pdf,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A finished export, ready to be offered for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    /// Suggested file name, e.g. `whiteboard_summary.txt`.
    pub file_name: String,
    pub mime_type: String,
    /// Serialised as a length only; JSON output should not carry a PDF.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
    /// Page count for paginated formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
}

/// Measurements of a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub image_width: u32,
    pub image_height: u32,
    /// Size of the JPEG sent to the service, before base64.
    pub payload_bytes: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub load_duration_ms: u64,
    pub encode_duration_ms: u64,
    pub request_duration_ms: u64,
    pub export_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// The model's text, exactly as returned.
    pub summary: String,
    /// Model identifier reported by the service, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub artifacts: Vec<ExportArtifact>,
    pub stats: SummaryStats,
}

impl SummaryOutput {
    /// The artifact of `format`, if it was requested.
    pub fn artifact(&self, format: ExportFormat) -> Option<&ExportArtifact> {
        self.artifacts.iter().find(|a| a.format == format)
    }
}

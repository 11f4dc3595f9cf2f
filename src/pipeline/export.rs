//! Export rendering: summary text → downloadable artifacts.
//!
//! Both renderers are pure functions of the summary text (plus the fixed
//! page layout for PDF). Neither touches the network or the file system;
//! writing artifacts to disk is [`crate::summarize::write_artifacts`]'s job
//! and only happens when the user asks for it.

use crate::error::SummaryError;
use crate::output::{ExportArtifact, ExportFormat};
use textpdf::PageLayout;
use tracing::debug;

/// `<stem>.<ext>` for `format`.
pub fn artifact_file_name(stem: &str, format: ExportFormat) -> String {
    format!("{}.{}", stem, format.extension())
}

/// The summary's UTF-8 bytes, untouched.
pub fn export_text(summary: &str, stem: &str) -> ExportArtifact {
    let bytes = summary.as_bytes().to_vec();
    ExportArtifact {
        format: ExportFormat::Text,
        file_name: artifact_file_name(stem, ExportFormat::Text),
        mime_type: ExportFormat::Text.mime_type().to_string(),
        size_bytes: bytes.len(),
        bytes,
        pages: None,
    }
}

/// The summary laid out on fixed-size pages in a single fixed font.
pub fn export_pdf(
    summary: &str,
    stem: &str,
    layout: &PageLayout,
) -> Result<ExportArtifact, SummaryError> {
    let pdf = textpdf::render_pdf(summary, layout).map_err(|e| SummaryError::Export {
        format: ExportFormat::Pdf,
        detail: e.to_string(),
    })?;
    debug!("Rendered PDF: {} pages, {} bytes", pdf.page_count, pdf.bytes.len());

    Ok(ExportArtifact {
        format: ExportFormat::Pdf,
        file_name: artifact_file_name(stem, ExportFormat::Pdf),
        mime_type: ExportFormat::Pdf.mime_type().to_string(),
        size_bytes: pdf.bytes.len(),
        bytes: pdf.bytes,
        pages: Some(pdf.page_count),
    })
}

/// Render every format in `formats`, in order.
pub fn export_all(
    summary: &str,
    formats: &[ExportFormat],
    stem: &str,
    layout: &PageLayout,
) -> Result<Vec<ExportArtifact>, SummaryError> {
    formats
        .iter()
        .map(|format| match format {
            ExportFormat::Text => Ok(export_text(summary, stem)),
            ExportFormat::Pdf => export_pdf(summary, stem, layout),
        })
        .collect()
}

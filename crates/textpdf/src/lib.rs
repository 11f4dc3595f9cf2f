//! # textpdf
//!
//! Lay plain text out onto fixed-size PDF pages with the built-in Courier
//! font: greedy word wrap, hard breaks for over-long words, automatic page
//! breaks. No font files are embedded and no external library is needed.
//!
//! ```rust
//! use textpdf::{render_pdf, PageLayout};
//!
//! let pdf = render_pdf("Q1 targets: 50 units", &PageLayout::default()).unwrap();
//! assert_eq!(pdf.page_count, 1);
//! assert!(pdf.bytes.starts_with(b"%PDF"));
//! ```
//!
//! ## Limits
//!
//! The standard 14 fonts only cover WinAnsiEncoding. Characters outside it
//! are drawn as `?`; they still occupy one column so wrapping stays exact.

pub mod layout;
pub mod render;

pub use layout::{layout_text, paginate, wrap_text, PageLayout};
pub use render::{encode_win_ansi, render_pdf, RenderedPdf};

use thiserror::Error;

/// Errors returned by textpdf.
#[derive(Error, Debug)]
pub enum TextPdfError {
    /// Page geometry leaves no room for text.
    #[error("Invalid page layout: {0}")]
    InvalidLayout(String),

    /// lopdf failed to encode a content stream or serialise the document.
    #[error("Failed to write PDF: {0}")]
    Write(String),
}

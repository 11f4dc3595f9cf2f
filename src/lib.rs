//! # whiteboard-summary
//!
//! Summarise a photo of a whiteboard with a vision language model and export
//! the summary as plain text or as a paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! whiteboard photo (JPEG / PNG, path or URL)
//!  │
//!  ├─ 1. Gate    no credential → stop, nothing is read or sent
//!  ├─ 2. Load    read the file / download the URL, decode the image
//!  ├─ 3. Encode  re-encode as JPEG → data:image/jpeg;base64,…
//!  ├─ 4. Request one chat-completions call: fixed prompt + image, 300 tokens
//!  └─ 5. Export  whiteboard_summary.txt (raw bytes) + whiteboard_summary.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whiteboard_summary::{summarize, Credential, ExportFormat, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = std::env::var("OPENAI_API_KEY")?;
//!     let credential = Credential::new(key).ok_or("empty API key")?;
//!     let config = SummaryConfig::default();
//!
//!     let output = summarize("board.jpg", &credential, &config).await?;
//!     println!("{}", output.summary);
//!
//!     let pdf = output.artifact(ExportFormat::Pdf).expect("PDF export is on by default");
//!     std::fs::write(&pdf.file_name, &pdf.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! The credential is handed over explicitly and kept inside the HTTP
//! client; the library never reads or writes it through the process
//! environment.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `whiteboard-summary` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credential;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use credential::Credential;
pub use error::SummaryError;
pub use output::{ExportArtifact, ExportFormat, SummaryOutput, SummaryStats};
pub use pipeline::encode::EncodedPayload;
pub use pipeline::llm::{ChatRequest, ChatResponse, ChatTransport, OpenAiTransport};
pub use progress::{NoopProgressCallback, ProgressCallback, Stage, SummaryProgressCallback};
pub use summarize::{
    run_session, summarize, summarize_bytes, summarize_sync, write_artifacts, ImageSource,
    SessionOutcome,
};
pub use textpdf::PageLayout;

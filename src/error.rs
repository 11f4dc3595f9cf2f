//! Error types for the whiteboard-summary library.
//!
//! One error type, [`SummaryError`], covers every way a summary can fail.
//! There is no partial success: an upload either yields a complete
//! [`crate::output::SummaryOutput`] or one of these errors, and nothing is
//! retried internally. Every variant renders as a message fit to show the
//! user as-is.
//!
//! The four failure kinds a caller most often needs to tell apart:
//!
//! | Kind | Variant | Typical cause |
//! |------|---------|---------------|
//! | DecodeError | [`SummaryError::Decode`] | upload is not a readable JPEG/PNG |
//! | AuthError | [`SummaryError::Auth`] | key missing, invalid or expired |
//! | TransportError | [`SummaryError::Transport`] | network down, service unavailable |
//! | ResponseError | [`SummaryError::Response`] | no choices, no text, unparsable body |
//!
//! A missing credential is deliberately *not* an error: see
//! [`crate::summarize::SessionOutcome::CredentialRequired`].

use crate::output::ExportFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the whiteboard-summary library.
#[derive(Debug, Error)]
pub enum SummaryError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a usable path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The uploaded bytes are not a decodable JPEG or PNG image.
    #[error("Could not decode the uploaded image: {detail}")]
    Decode { detail: String },

    /// Re-encoding the decoded image as JPEG failed.
    #[error("Could not re-encode the image as JPEG: {detail}")]
    Encode { detail: String },

    // ── Remote service errors ─────────────────────────────────────────────
    /// The service refused the credential (HTTP 401/403).
    ///
    /// `message` is the service's own explanation, unmodified.
    #[error("Authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The request never completed: connection, TLS, timeout, or the
    /// service reported itself unavailable (HTTP 429/5xx).
    #[error("Could not reach the summary service: {detail}")]
    Transport { detail: String },

    /// The service answered with a non-success status other than an
    /// authentication or availability failure (bad model name, oversized
    /// payload, …).
    #[error("Summary service rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered, but not with a usable summary.
    #[error("Summary service returned an unusable response: {detail}")]
    Response { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Rendering an export artifact failed.
    #[error("Failed to render {format} export: {detail}")]
    Export { format: ExportFormat, detail: String },

    /// Could not create or write an artifact file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SummaryError {
    /// Map an HTTP error status and its body to the matching variant.
    ///
    /// The message is taken from an OpenAI-style `{"error": {"message": …}}`
    /// body when present, otherwise the raw body text is used verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = service_message(body);
        match status {
            401 | 403 => SummaryError::Auth { status, message },
            429 | 500..=599 => SummaryError::Transport {
                detail: format!("HTTP {status}: {message}"),
            },
            _ => SummaryError::Rejected { status, message },
        }
    }
}

fn service_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

impl From<reqwest::Error> for SummaryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SummaryError::Response {
                detail: e.to_string(),
            }
        } else {
            SummaryError::Transport {
                detail: e.to_string(),
            }
        }
    }
}

//! Configuration types for whiteboard summarisation.
//!
//! All behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The credential is *not* part of the
//! configuration: it is passed to [`crate::summarize::summarize`] (or to
//! [`crate::pipeline::llm::OpenAiTransport::new`]) explicitly, so a config
//! can be logged or shared between sessions without carrying a secret.

use crate::error::SummaryError;
use crate::output::ExportFormat;
use crate::pipeline::llm::ChatTransport;
use crate::progress::ProgressCallback;
use crate::prompts::DEFAULT_SUMMARY_PROMPT;
use std::fmt;
use std::sync::Arc;
use textpdf::PageLayout;

/// Default chat-completions base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default artifact file stem.
pub const DEFAULT_ARTIFACT_STEM: &str = "whiteboard_summary";

/// Configuration for a whiteboard summary run.
///
/// # Example
/// ```rust
/// use whiteboard_summary::{ExportFormat, SummaryConfig};
///
/// let config = SummaryConfig::builder()
///     .model("gpt-4o")
///     .exports(vec![ExportFormat::Text])
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 300);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Model identifier sent with the request. Default: [`DEFAULT_MODEL`].
    ///
    /// Accepted identifiers change on the service side over time, so this is
    /// a setting rather than a constant.
    pub model: String,

    /// Base URL of an OpenAI-compatible API. `/chat/completions` is appended.
    pub base_url: String,

    /// Instruction sent with the image. Default: [`DEFAULT_SUMMARY_PROMPT`].
    pub prompt: String,

    /// Cap on generated tokens. Default: 300.
    pub max_tokens: u32,

    /// Sampling temperature. Default: unset (service default).
    pub temperature: Option<f32>,

    /// JPEG quality for the re-encoded upload, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Whole-request timeout for the summary call. Default: none, the
    /// request runs until the transport gives up.
    pub api_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Formats to export, in order. Default: text then PDF.
    pub exports: Vec<ExportFormat>,

    /// File name stem for artifacts. Default: [`DEFAULT_ARTIFACT_STEM`].
    pub artifact_stem: String,

    /// Page geometry for the PDF export.
    pub page_layout: PageLayout,

    /// Pre-constructed transport. Takes precedence over the built-in
    /// OpenAI-compatible client.
    pub transport: Option<Arc<dyn ChatTransport>>,

    /// Stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
            max_tokens: 300,
            temperature: None,
            jpeg_quality: 75,
            api_timeout_secs: None,
            download_timeout_secs: 120,
            exports: vec![ExportFormat::Text, ExportFormat::Pdf],
            artifact_stem: DEFAULT_ARTIFACT_STEM.to_string(),
            page_layout: PageLayout::default(),
            transport: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt", &self.prompt)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("exports", &self.exports)
            .field("artifact_stem", &self.artifact_stem)
            .field("page_layout", &self.page_layout)
            .field("transport", &self.transport.as_ref().map(|_| "<dyn ChatTransport>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SummaryProgressCallback>"),
            )
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `format` will be produced.
    pub fn exports_format(&self, format: ExportFormat) -> bool {
        self.exports.contains(&format)
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn exports(mut self, formats: Vec<ExportFormat>) -> Self {
        self.config.exports = formats;
        self
    }

    pub fn artifact_stem(mut self, stem: impl Into<String>) -> Self {
        self.config.artifact_stem = stem.into();
        self
    }

    pub fn page_layout(mut self, layout: PageLayout) -> Self {
        self.config.page_layout = layout;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<SummaryConfig, SummaryError> {
        let c = &mut self.config;
        if c.model.trim().is_empty() {
            return Err(SummaryError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(SummaryError::InvalidConfig(format!(
                "Base URL must be http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.prompt.trim().is_empty() {
            return Err(SummaryError::InvalidConfig("Prompt must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(SummaryError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(SummaryError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.artifact_stem.is_empty() || c.artifact_stem.contains(['/', '\\']) {
            return Err(SummaryError::InvalidConfig(format!(
                "Artifact stem must be a plain file name, got '{}'",
                c.artifact_stem
            )));
        }
        c.page_layout
            .validate()
            .map_err(|e| SummaryError::InvalidConfig(e.to_string()))?;

        // Duplicates would produce the same artifact twice.
        let mut seen = Vec::with_capacity(c.exports.len());
        c.exports.retain(|f| {
            if seen.contains(f) {
                false
            } else {
                seen.push(*f);
                true
            }
        });

        Ok(self.config)
    }
}

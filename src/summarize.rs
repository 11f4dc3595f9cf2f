//! Summary entry points: one upload in, one summary (and its exports) out.
//!
//! Every stage receives the previous stage's output as an argument:
//!
//! ```text
//! resolve_input ─▶ decode_image ─▶ encode_image ─▶ request_summary ─▶ export_all
//!   Vec<u8>          DynamicImage     EncodedPayload    summary text      artifacts
//! ```
//!
//! [`run_session`] adds the credential gate in front: without a usable key
//! it returns [`SessionOutcome::CredentialRequired`] before touching the
//! input or the network.

use crate::config::SummaryConfig;
use crate::credential::Credential;
use crate::error::SummaryError;
use crate::output::{SummaryOutput, SummaryStats};
use crate::pipeline::llm::{self, ChatTransport, OpenAiTransport};
use crate::pipeline::{encode, export, input};
use crate::progress::Stage;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the whiteboard image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A local path or HTTP/HTTPS URL.
    Location(String),
    /// Bytes already in memory (an upload body, stdin, …).
    Bytes(Vec<u8>),
}

/// What a session produced.
#[derive(Debug)]
pub enum SessionOutcome {
    /// No usable credential was supplied; nothing was read or sent.
    CredentialRequired,
    /// A summary was produced.
    Completed(SummaryOutput),
}

/// Gate on the credential, then summarise `source`.
///
/// `raw_credential` is whatever the user typed (or `None` if they typed
/// nothing). Blank input never reaches the transport.
pub async fn run_session(
    raw_credential: Option<&str>,
    source: ImageSource,
    config: &SummaryConfig,
) -> Result<SessionOutcome, SummaryError> {
    let Some(credential) = raw_credential.and_then(Credential::new) else {
        info!("No credential supplied; waiting for one");
        return Ok(SessionOutcome::CredentialRequired);
    };

    let output = match source {
        ImageSource::Location(location) => summarize(location, &credential, config).await?,
        ImageSource::Bytes(bytes) => summarize_bytes(&bytes, &credential, config).await?,
    };
    Ok(SessionOutcome::Completed(output))
}

/// Summarise the whiteboard image at a local path or HTTP/HTTPS URL.
///
/// # Errors
/// Any stage failure is returned as-is; see [`SummaryError`]. Nothing is
/// retried and no artifacts are produced unless the summary succeeded.
pub async fn summarize(
    input_str: impl AsRef<str>,
    credential: &Credential,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting summary: {}", input_str);

    // ── Step 1: Get/create transport ─────────────────────────────────────
    let transport = resolve_transport(credential, config)?;

    // ── Step 2: Resolve input and decode ─────────────────────────────────
    let timer = StageTimer::start(config, Stage::Load);
    let loaded = input::resolve_input(input_str, config.download_timeout_secs)
        .await
        .and_then(|bytes| encode::decode_image(&bytes));
    let (image, load_ms) = timer.finish_timed(loaded)?;

    summarize_decoded(image, load_ms, total_start, transport.as_ref(), config).await
}

/// Summarise an image already held in memory (e.g. an upload body).
pub async fn summarize_bytes(
    bytes: &[u8],
    credential: &Credential,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let total_start = Instant::now();
    let transport = resolve_transport(credential, config)?;

    let timer = StageTimer::start(config, Stage::Load);
    let (image, load_ms) = timer.finish_timed(encode::decode_image(bytes))?;

    summarize_decoded(image, load_ms, total_start, transport.as_ref(), config).await
}

/// Encode → request → export, starting from a decoded image.
async fn summarize_decoded(
    image: DynamicImage,
    load_ms: u64,
    total_start: Instant,
    transport: &dyn ChatTransport,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let mut stats = SummaryStats {
        load_duration_ms: load_ms,
        ..SummaryStats::default()
    };

    // ── Step 3: Re-encode as JPEG data URI ───────────────────────────────
    let timer = StageTimer::start(config, Stage::Encode);
    let (payload, encode_ms) =
        timer.finish_timed(encode::encode_image(&image, config.jpeg_quality))?;
    drop(image);
    stats.encode_duration_ms = encode_ms;
    stats.image_width = payload.width;
    stats.image_height = payload.height;
    stats.payload_bytes = payload.bytes.len();
    debug!(
        "Payload: {}x{} px, {} bytes JPEG",
        payload.width,
        payload.height,
        payload.bytes.len()
    );

    // ── Step 4: The one request ──────────────────────────────────────────
    let timer = StageTimer::start(config, Stage::Request);
    let (reply, request_ms) =
        timer.finish_timed(llm::request_summary(transport, &payload, config).await)?;
    drop(payload);
    stats.request_duration_ms = request_ms;
    stats.input_tokens = reply.input_tokens;
    stats.output_tokens = reply.output_tokens;

    // ── Step 5: Exports ──────────────────────────────────────────────────
    let timer = StageTimer::start(config, Stage::Export);
    let (artifacts, export_ms) = timer.finish_timed(export::export_all(
        &reply.summary,
        &config.exports,
        &config.artifact_stem,
        &config.page_layout,
    ))?;
    stats.export_duration_ms = export_ms;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Summary complete: {} chars, {} artifacts, {}ms total",
        reply.summary.len(),
        artifacts.len(),
        stats.total_duration_ms
    );

    Ok(SummaryOutput {
        summary: reply.summary,
        model: reply.model,
        artifacts,
        stats,
    })
}

/// Synchronous wrapper around [`summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    input_str: impl AsRef<str>,
    credential: &Credential,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummaryError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize(input_str, credential, config))
}

/// Write every artifact of `output` into `dir`, returning the paths written.
///
/// Each file is written to a temporary name first and then renamed, so a
/// crash never leaves a half-written artifact behind.
pub async fn write_artifacts(
    output: &SummaryOutput,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, SummaryError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SummaryError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(output.artifacts.len());
    for artifact in &output.artifacts {
        let path = dir.join(&artifact.file_name);
        let tmp_path = dir.join(format!("{}.tmp", artifact.file_name));

        tokio::fs::write(&tmp_path, &artifact.bytes)
            .await
            .map_err(|e| SummaryError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| SummaryError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        written.push(path);
    }

    Ok(written)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the configured transport if there is one, otherwise build the
/// OpenAI-compatible client around `credential`.
fn resolve_transport(
    credential: &Credential,
    config: &SummaryConfig,
) -> Result<Arc<dyn ChatTransport>, SummaryError> {
    if let Some(ref transport) = config.transport {
        return Ok(Arc::clone(transport));
    }
    let transport = OpenAiTransport::new(credential.clone(), config)?;
    debug!("Using {}", transport.endpoint());
    Ok(Arc::new(transport))
}

/// Times one stage and reports it to the progress callback.
struct StageTimer<'a> {
    config: &'a SummaryConfig,
    stage: Stage,
    start: Instant,
}

impl<'a> StageTimer<'a> {
    fn start(config: &'a SummaryConfig, stage: Stage) -> Self {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage_start(stage);
        }
        Self {
            config,
            stage,
            start: Instant::now(),
        }
    }

    fn finish_timed<T>(self, result: Result<T, SummaryError>) -> Result<(T, u64), SummaryError> {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_stage_complete(self.stage, elapsed_ms);
                }
                Ok((value, elapsed_ms))
            }
            Err(e) => {
                warn!("Stage {} failed after {}ms: {}", self.stage, elapsed_ms, e);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_stage_error(self.stage, &e.to_string());
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{ExportArtifact, ExportFormat};

    #[tokio::test]
    async fn blank_credential_short_circuits() {
        // The input does not exist: reaching it would be an error.
        let source = ImageSource::Location("/no/such/board.jpg".into());
        let outcome = run_session(Some("   "), source.clone(), &SummaryConfig::default())
            .await
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::CredentialRequired));

        let outcome = run_session(None, source, &SummaryConfig::default())
            .await
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::CredentialRequired));
    }

    #[tokio::test]
    async fn write_artifacts_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested/out");
        let output = SummaryOutput {
            summary: "abc".into(),
            model: None,
            artifacts: vec![ExportArtifact {
                format: ExportFormat::Text,
                file_name: "whiteboard_summary.txt".into(),
                mime_type: "text/plain".into(),
                bytes: b"abc".to_vec(),
                size_bytes: 3,
                pages: None,
            }],
            stats: SummaryStats::default(),
        };

        let written = write_artifacts(&output, &out_dir).await.unwrap();
        assert_eq!(written, vec![out_dir.join("whiteboard_summary.txt")]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"abc");
        assert!(!out_dir.join("whiteboard_summary.txt.tmp").exists());
    }
}

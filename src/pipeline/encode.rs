//! Image decoding and encoding: upload bytes → `DynamicImage` → JPEG data URI.
//!
//! The request declares a single MIME type for the image, so whatever was
//! uploaded (JPEG or PNG) is normalised to JPEG before it is sent. JPEG has
//! no alpha channel, so the image is flattened to 8-bit RGB first. There is
//! no resizing and no size cap: a large photo produces a proportionally
//! large payload.

use crate::error::SummaryError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// MIME type of every payload this module produces.
pub const PAYLOAD_MIME_TYPE: &str = "image/jpeg";

/// A JPEG-encoded image ready to embed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// The JPEG byte stream.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedPayload {
    pub fn mime_type(&self) -> &'static str {
        PAYLOAD_MIME_TYPE
    }

    /// Standard (padded) base64 of the JPEG bytes.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/jpeg;base64,<payload>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.base64())
    }
}

/// Decode uploaded bytes as a JPEG or PNG image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, SummaryError> {
    if bytes.is_empty() {
        return Err(SummaryError::Decode {
            detail: "the upload is empty".into(),
        });
    }

    let format = image::guess_format(bytes).map_err(|e| SummaryError::Decode {
        detail: e.to_string(),
    })?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(SummaryError::Decode {
            detail: format!("{format:?} images are not supported, upload a JPEG or PNG"),
        });
    }

    // Large photos are legal uploads; lift the decoder's allocation cap.
    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.no_limits();
    let img = reader.decode().map_err(|e| SummaryError::Decode {
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded {:?} upload → {}x{} px",
        format,
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Re-encode `img` as JPEG at `quality` (1–100).
pub fn encode_image(img: &DynamicImage, quality: u8) -> Result<EncodedPayload, SummaryError> {
    let rgb = img.to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| SummaryError::Encode {
            detail: e.to_string(),
        })?;

    debug!(
        "Encoded {}x{} image → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        bytes.len()
    );

    Ok(EncodedPayload {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and bytes.
///
/// Returns `None` for anything that is not a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

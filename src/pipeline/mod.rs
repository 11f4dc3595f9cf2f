//! Pipeline stages for whiteboard summarisation.
//!
//! Each submodule implements exactly one transformation step and takes the
//! previous step's output as an explicit argument.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ export
//! (bytes)   (JPEG URI)  (text)  (txt / pdf)
//! ```
//!
//! 1. [`input`]: turn a path or URL into raw image bytes
//! 2. [`encode`]: decode JPEG/PNG, re-encode as JPEG, wrap as a data URI
//! 3. [`llm`]: the single chat-completions round trip; the only stage
//!    that talks to the summary service
//! 4. [`export`]: pure renderers from summary text to download artifacts

pub mod encode;
pub mod export;
pub mod input;
pub mod llm;

//! The instruction sent alongside every whiteboard image.
//!
//! Callers can override it via [`crate::config::SummaryConfig::prompt`];
//! the constant here is used when no override is given.

/// Default instruction, sent as the text part of the user message.
pub const DEFAULT_SUMMARY_PROMPT: &str = "Write a summary of what is written on this whiteboard";

//! LLM-backed startup valuation toolkit.
//!
//! The crate exposes the valuation pipeline as a library (prompt
//! construction, provider client, untrusted-output extraction) plus the
//! CLI command implementations used by the `valuator` and `appraise`
//! binaries.

/// CLI command implementations.
pub mod commands;
/// Profile config file loading.
pub mod config;
/// Stderr tracing setup shared by the binaries.
pub mod logging;
/// Core valuation pipeline.
pub mod valuation;

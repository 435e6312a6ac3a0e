//! LLM-backed startup valuation pipeline.
//!
//! The module turns a structured startup profile into a chat-completion
//! request, sends it to an OpenAI-compatible provider, and recovers a
//! typed valuation from the model's free-text reply.

/// Outbound chat-completions client and calculate pipeline.
pub mod client;
/// Response envelope parsing, fence stripping, and result validation.
pub mod extract;
/// System/user prompt construction.
pub mod prompt;
/// Provider configuration, chat messages, and error taxonomy.
pub mod provider;
/// Startup profile request type.
pub mod request;

//! llmstream - streaming clients for hosted and local language models
//!
//! Two independent adapters normalize differently shaped streaming APIs
//! into incremental results:
//!
//! - **bedrock**: AWS Bedrock converse stream, yielding full-conversation
//!   snapshots with the assistant reply growing in place
//! - **ollama**: local Ollama daemon, yielding non-cumulative text
//!   fragments followed by one terminal record with statistics

pub mod errors;
pub mod types;

// Adapters
pub mod bedrock;
pub mod ollama;

// Display-only price data
pub mod pricing;

// Ambient: configuration, CLI arguments, logging
pub mod cli;
pub mod logging;

// Re-export commonly used types
pub use errors::{LlmError, Result};
pub use types::{Message, MessageContent, Role};

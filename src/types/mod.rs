//! Type definitions module
//!
//! Message model shared by the Bedrock and Ollama adapters.

pub mod messages;

// Re-export commonly used types
pub use messages::{Message, MessageContent, Role};

//! Local-daemon streaming adapter
//!
//! Talks to an Ollama daemon over HTTP and decodes its NDJSON streams
//! into text fragments followed by one terminal record.

pub mod client;
pub mod options;
pub mod parser;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use client::{ItemStream, OllamaClient, PullStream, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use options::{ChatRequest, GenerateRequest, GenerationOptions};
pub use parser::{LineDecoder, MAX_LINE_SIZE};
pub use stream::{GenerationState, StreamMode};
pub use types::{Completion, GenerationStats, ModelInfo, PullProgress, StreamEvent, StreamItem};

//! Managed-endpoint streaming adapter
//!
//! Streams chat replies from AWS Bedrock's converse API as a sequence of
//! full-conversation snapshots.

pub mod accumulator;
pub mod chat;
pub mod client;
pub mod request;

// Re-export commonly used types
pub use accumulator::CandidateBuffers;
pub use chat::{stream_chat, ChatParams, SnapshotStream};
pub use client::{BedrockClient, ConverseEvent, ConverseStreamClient, EventStream, DEFAULT_REGION};
pub use request::{ConverseRequest, InferenceConfig, DEFAULT_MAX_TOKENS, TEMPERATURE, TOP_P};

//! Converse request construction
//!
//! Splits a conversation into the system instruction and the ordered
//! user/assistant turns, and attaches the fixed sampling configuration.
//! The serialized form matches the converse API body:
//!
//! ```text
//! {"modelId": "...",
//!  "messages": [{"role": "user", "content": [{"text": "..."}]}],
//!  "inferenceConfig": {"maxTokens": 4096, "temperature": 0.7, "topP": 0.9},
//!  "system": [{"text": "..."}]}
//! ```

use crate::types::{Message, Role};
use serde::Serialize;

/// Sampling temperature attached to every call
pub const TEMPERATURE: f32 = 0.7;

/// Nucleus sampling mass attached to every call
pub const TOP_P: f32 = 0.9;

/// Default generation budget
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A text content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub text: String,
}

/// Role of a forwarded turn; system text never appears here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One forwarded conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: Vec<TextBlock>,
}

/// Sampling configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl InferenceConfig {
    /// Fixed sampling with the caller's token budget
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

/// Provider-neutral converse-stream request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub model_id: String,
    pub messages: Vec<Turn>,
    pub inference_config: InferenceConfig,
    pub system: Vec<TextBlock>,
}

impl ConverseRequest {
    /// Build a request from a conversation
    ///
    /// Every `system` message is pulled out of the turn list; when there are
    /// several, the last one is kept. An empty conversation is forwarded as-is.
    ///
    /// An assistant turn holding
    /// [`Candidates`](crate::types::MessageContent::Candidates) is sent as
    /// its first slot; the remaining slots are dropped.
    pub fn new(model_id: impl Into<String>, messages: &[Message], max_tokens: u32) -> Self {
        let mut system = Vec::new();
        let mut turns = Vec::with_capacity(messages.len());

        for message in messages {
            let block = TextBlock {
                text: message.text().to_string(),
            };
            match message.role {
                Role::System => system = vec![block],
                Role::User => turns.push(Turn {
                    role: TurnRole::User,
                    content: vec![block],
                }),
                Role::Assistant => turns.push(Turn {
                    role: TurnRole::Assistant,
                    content: vec![block],
                }),
            }
        }

        Self {
            model_id: model_id.into(),
            messages: turns,
            inference_config: InferenceConfig::with_max_tokens(max_tokens),
            system,
        }
    }

    /// System instruction text, if any
    pub fn system_text(&self) -> Option<&str> {
        self.system.first().map(|b| b.text.as_str())
    }
}

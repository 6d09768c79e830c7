//! Conversation message types
//!
//! Shared by both adapters. A conversation is an ordered `Vec<Message>`;
//! while a reply streams in, its last element is the assistant turn
//! being filled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a message
///
/// Serialized untagged, so a single reply is a plain JSON string and a
/// multi-candidate reply is an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    /// One text body
    Text(String),

    /// One accumulated body per candidate slot
    Candidates(Vec<String>),
}

impl MessageContent {
    /// Text of the message, or of the first candidate slot
    pub fn primary(&self) -> &str {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Candidates(slots) => slots.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Number of candidate slots represented
    pub fn candidate_count(&self) -> usize {
        match self {
            MessageContent::Text(_) => 1,
            MessageContent::Candidates(slots) => slots.len(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

/// A single conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Text of the message (first candidate for multi-candidate replies)
    pub fn text(&self) -> &str {
        self.content.primary()
    }
}

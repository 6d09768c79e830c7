//! Per-candidate text accumulation
//!
//! Every delta is appended to all `n` slots. The converse API returns a
//! single completion, so with `n > 1` the slots always hold identical
//! text; the shape exists for callers that render `n` columns.

use crate::errors::{LlmError, Result};
use crate::types::MessageContent;

/// Accumulated text for each candidate slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBuffers {
    slots: Vec<String>,
}

impl CandidateBuffers {
    /// Create `n` empty slots; `n` must be at least 1
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(LlmError::InvalidArgument(
                "candidate count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            slots: vec![String::new(); n],
        })
    }

    /// Append a delta to every slot
    ///
    /// Returns `false` for an empty delta, which leaves the slots unchanged.
    pub fn push(&mut self, delta: &str) -> bool {
        if delta.is_empty() {
            return false;
        }
        for slot in &mut self.slots {
            slot.push_str(delta);
        }
        true
    }

    /// Current content: a single string for one slot, a list otherwise
    pub fn content(&self) -> MessageContent {
        match self.slots.as_slice() {
            [single] => MessageContent::Text(single.clone()),
            slots => MessageContent::Candidates(slots.to_vec()),
        }
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }
}

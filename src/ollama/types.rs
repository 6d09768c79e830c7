//! Wire and result types for the Ollama API
//!
//! This module defines the data structures exchanged with the daemon:
//! model descriptors, stream events, completion statistics and pull
//! progress records.

use crate::types::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Information about an installed Ollama model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (e.g., "qwen2.5-coder:3b")
    pub name: String,

    /// Model size in bytes
    pub size: u64,

    /// Last modification time
    pub modified_at: DateTime<Utc>,

    /// Model digest/hash
    pub digest: String,

    /// Model details (optional, from API)
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

/// Detailed model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDetails {
    /// Model format (e.g., "gguf")
    #[serde(default)]
    pub format: Option<String>,

    /// Model family (e.g., "llama", "qwen2")
    #[serde(default)]
    pub family: Option<String>,

    /// Parameter size (e.g., "7B", "13B")
    #[serde(default)]
    pub parameter_size: Option<String>,

    /// Quantization level (e.g., "Q4_0", "Q4_K_M")
    #[serde(default)]
    pub quantization_level: Option<String>,
}

/// Response from Ollama /api/tags endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Non-streaming /api/generate response
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    pub response: String,
}

/// Non-streaming /api/chat response
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub message: Message,
}

/// Response from /api/embeddings
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    pub embedding: Vec<f64>,
}

/// Generation statistics reported on the terminal event
///
/// Durations are nanoseconds, as reported by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub prompt_eval_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub eval_duration: Option<u64>,
    #[serde(default)]
    pub done_reason: Option<String>,
}

impl GenerationStats {
    /// Generated tokens per second, when both count and duration are known
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(duration)) if duration > 0 => {
                Some(count as f64 / (duration as f64 / 1_000_000_000.0))
            }
            _ => None,
        }
    }
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        let millis = |v: Option<u64>| {
            v.map(|n| format!("{:.1}ms", n as f64 / 1_000_000.0))
                .unwrap_or_else(|| "-".into())
        };

        write!(
            f,
            "prompt tokens {} ({}), generated tokens {} ({}), load {}, total {}",
            count(self.prompt_eval_count),
            millis(self.prompt_eval_duration),
            count(self.eval_count),
            millis(self.eval_duration),
            millis(self.load_duration),
            millis(self.total_duration),
        )?;
        if let Some(rate) = self.tokens_per_second() {
            write!(f, ", {:.1} tok/s", rate)?;
        }
        Ok(())
    }
}

/// One decoded NDJSON line from /api/generate or /api/chat
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamEvent {
    /// Generate-mode fragment
    #[serde(default)]
    pub response: Option<String>,

    /// Chat-mode fragment
    #[serde(default)]
    pub message: Option<Message>,

    /// Terminal marker
    #[serde(default)]
    pub done: bool,

    /// Error reported by the daemon mid-stream
    #[serde(default)]
    pub error: Option<String>,

    /// Statistics, populated on the terminal event
    #[serde(flatten)]
    pub stats: GenerationStats,
}

/// Terminal record of a streamed generation
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Concatenation of every fragment
    pub full_response: String,

    /// Assembled assistant message (chat mode only)
    pub message: Option<Message>,

    /// Statistics from the terminal event
    pub stats: GenerationStats,
}

/// Item produced by a generate or chat stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// Text produced since the previous fragment
    Fragment(String),

    /// Generation finished; always the last item when present
    Done(Completion),
}

/// Progress update during model pull operation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullProgress {
    /// Status message
    #[serde(default)]
    pub status: String,

    /// Digest being pulled
    #[serde(default)]
    pub digest: Option<String>,

    /// Total bytes to download
    #[serde(default)]
    pub total: Option<u64>,

    /// Bytes completed
    #[serde(default)]
    pub completed: Option<u64>,

    /// Error reported by the daemon mid-pull
    #[serde(default)]
    pub error: Option<String>,
}

impl PullProgress {
    /// Percentage of `total` completed; `None` when the daemon reports no total
    pub fn percentage(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                Some(self.completed.unwrap_or(0) as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// Whether the daemon reported the pull as finished
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// One-line progress report
    pub fn describe(&self) -> String {
        match self.percentage() {
            Some(pct) => format!("Progress: {:.2}% - {}", pct, self.status),
            None => format!("Status: {}", self.status),
        }
    }
}

impl ModelInfo {
    /// Format the model size in human-readable format
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }

    /// Get a short description of the model
    pub fn description(&self) -> String {
        if let Some(ref details) = self.details {
            let parts: Vec<&str> = [&details.parameter_size, &details.quantization_level]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();

            if !parts.is_empty() {
                return parts.join(" ");
            }
        }

        self.formatted_size()
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.formatted_size())
    }
}

/// Format bytes into human-readable size
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base: f64 = 1024.0;
    let exponent = (bytes as f64).log(base).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    let size = bytes as f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    #[test]
    fn test_pull_percentage() {
        let progress = PullProgress {
            status: "pulling manifest".to_string(),
            completed: Some(50),
            total: Some(200),
            ..Default::default()
        };
        assert_eq!(progress.percentage(), Some(25.0));
        assert_eq!(progress.describe(), "Progress: 25.00% - pulling manifest");
    }

    #[test]
    fn test_pull_without_total() {
        let progress = PullProgress {
            status: "verifying sha256 digest".to_string(),
            total: Some(0),
            ..Default::default()
        };
        assert_eq!(progress.percentage(), None);
        assert_eq!(progress.describe(), "Status: verifying sha256 digest");
    }

    #[test]
    fn test_stream_event_terminal_stats() {
        let line = r#"{"model":"qwen2.5-coder:3b","response":"","done":true,"done_reason":"stop","total_duration":5000000,"eval_count":12,"eval_duration":2000000000}"#;
        let event: StreamEvent = serde_json::from_str(line).unwrap();

        assert!(event.done);
        assert_eq!(event.stats.eval_count, Some(12));
        assert_eq!(event.stats.done_reason.as_deref(), Some("stop"));
        assert_eq!(event.stats.prompt_eval_count, None);
        assert_eq!(event.stats.tokens_per_second(), Some(6.0));
    }

    #[test]
    fn test_model_info_from_tags() {
        let json = r#"{
            "name": "qwen2.5-coder:3b",
            "modified_at": "2024-11-12T10:00:00.000000Z",
            "size": 1929912432,
            "digest": "e7149271c348",
            "details": {"format": "gguf", "family": "qwen2", "parameter_size": "3.1B", "quantization_level": "Q4_K_M"}
        }"#;
        let info: ModelInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.description(), "3.1B Q4_K_M");
        assert_eq!(info.to_string(), "qwen2.5-coder:3b (1.80 GB)");
    }
}

//! NDJSON stream decoding for generate, chat and pull responses
//!
//! A response body becomes a stream of typed items in two steps: the
//! [`LineDecoder`] cuts the byte stream into lines, then an explicit
//! accumulator folds each decoded event into the items it produces.
//!
//! ```text
//! {"response":"Hello","done":false}
//! {"response":" world","done":false}
//! {"response":"","done":true,"eval_count":12,...}
//! ```
//! becomes `Fragment("Hello")`, `Fragment(" world")`,
//! `Done(Completion { full_response: "Hello world", .. })`.

use crate::errors::{LlmError, Result};
use crate::ollama::parser::LineDecoder;
use crate::ollama::types::{Completion, PullProgress, StreamEvent, StreamItem};
use crate::types::Message;
use async_stream::try_stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;

/// Which endpoint a stream came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// /api/generate: fragments arrive in `response`
    Generate,

    /// /api/chat: fragments arrive in `message.content`
    Chat,
}

/// Accumulator for one streamed generation
#[derive(Debug, Clone)]
pub struct GenerationState {
    mode: StreamMode,
    full_response: String,
    finished: bool,
}

impl GenerationState {
    pub fn new(mode: StreamMode) -> Self {
        Self {
            mode,
            full_response: String::new(),
            finished: false,
        }
    }

    /// Fold one event into the state, returning the items it produces
    ///
    /// Empty fragments produce nothing. The terminal event produces a
    /// [`StreamItem::Done`] after any text it carries; events after it are
    /// ignored.
    pub fn apply(&mut self, event: StreamEvent) -> Result<Vec<StreamItem>> {
        if self.finished {
            return Ok(Vec::new());
        }
        if let Some(error) = event.error {
            return Err(LlmError::StreamingError(error));
        }

        let mut items = Vec::new();
        let fragment = match self.mode {
            StreamMode::Generate => event.response.unwrap_or_default(),
            StreamMode::Chat => event
                .message
                .map(|m| m.content.primary().to_string())
                .unwrap_or_default(),
        };
        if !fragment.is_empty() {
            self.full_response.push_str(&fragment);
            items.push(StreamItem::Fragment(fragment));
        }

        if event.done {
            self.finished = true;
            let message = match self.mode {
                StreamMode::Chat => Some(Message::assistant(self.full_response.clone())),
                StreamMode::Generate => None,
            };
            items.push(StreamItem::Done(Completion {
                full_response: self.full_response.clone(),
                message,
                stats: event.stats,
            }));
        }

        Ok(items)
    }

    /// Text accumulated so far
    pub fn full_response(&self) -> &str {
        &self.full_response
    }

    /// Whether the terminal event has been applied
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Decode an NDJSON body into lines parsed as `T`
pub(crate) fn ndjson<S, E, T>(byte_stream: S) -> impl Stream<Item = Result<T>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    try_stream! {
        let mut decoder = LineDecoder::new();
        let mut body = Box::pin(byte_stream);

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Into::<LlmError>::into)?;
            for line in decoder.push(&chunk)? {
                yield parse_line::<T>(&line)?;
            }
        }

        if let Some(line) = decoder.finish()? {
            yield parse_line::<T>(&line)?;
        }
    }
}

/// Decode a generate or chat body into fragments and a terminal record
///
/// The stream ends after the terminal record, or when the body ends if the
/// daemon never sends one.
pub fn generation_stream<S, E>(
    byte_stream: S,
    mode: StreamMode,
) -> impl Stream<Item = Result<StreamItem>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    try_stream! {
        let mut state = GenerationState::new(mode);
        let mut events = Box::pin(ndjson::<_, _, StreamEvent>(byte_stream));

        while let Some(event) = events.next().await {
            for item in state.apply(event?)? {
                yield item;
            }
            if state.is_finished() {
                tracing::debug!(chars = state.full_response().len(), "generation finished");
                break;
            }
        }
    }
}

/// Decode a pull body into progress records
pub fn pull_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<PullProgress>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    try_stream! {
        let mut events = Box::pin(ndjson::<_, _, PullProgress>(byte_stream));

        while let Some(progress) = events.next().await {
            let mut progress = progress?;
            if let Some(error) = progress.error.take() {
                Err::<(), _>(LlmError::StreamingError(error))?;
            }
            yield progress;
        }
    }
}

fn parse_line<T: DeserializeOwned>(line: &str) -> Result<T> {
    serde_json::from_str(line)
        .map_err(|e| LlmError::JsonParseError(format!("{}: {}", e, line)))
}

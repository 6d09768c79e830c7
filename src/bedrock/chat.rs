//! Streaming chat over a converse session
//!
//! Produces one owned snapshot of the whole conversation per non-empty
//! delta. The trailing assistant message is appended before the first
//! event is read and is the only message whose content changes.

use crate::bedrock::accumulator::CandidateBuffers;
use crate::bedrock::client::{ConverseEvent, ConverseStreamClient};
use crate::bedrock::request::{ConverseRequest, DEFAULT_MAX_TOKENS};
use crate::errors::Result;
use crate::types::Message;
use async_stream::try_stream;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::{debug, error};

/// Stream of conversation snapshots
pub type SnapshotStream = BoxStream<'static, Result<Vec<Message>>>;

/// Parameters for one streaming chat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatParams {
    pub model: String,
    pub max_tokens: u32,
    /// Number of candidate slots in the reply
    pub n: usize,
}

impl ChatParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            n: 1,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn candidates(mut self, n: usize) -> Self {
        self.n = n;
        self
    }
}

/// Stream a chat reply as conversation snapshots
///
/// Opening failures are logged and returned. Read failures are logged and
/// surface as the stream's last item. A stream that ends without a stop
/// event simply ends after the last snapshot.
pub async fn stream_chat<C>(
    client: &C,
    messages: Vec<Message>,
    params: &ChatParams,
) -> Result<SnapshotStream>
where
    C: ConverseStreamClient + ?Sized,
{
    let mut buffers = CandidateBuffers::new(params.n)?;
    let request = ConverseRequest::new(&params.model, &messages, params.max_tokens);

    let mut events = client.converse_stream(&request).await.map_err(|e| {
        error!(model = %params.model, error = %e, "Can't invoke model");
        e
    })?;

    let model = params.model.clone();
    let mut conversation = messages;
    conversation.push(Message::assistant(buffers.content()));

    let snapshots = try_stream! {
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| {
                error!(model = %model, error = %e, "converse stream failed");
                e
            })?;

            match event {
                ConverseEvent::ContentBlockDelta { text } => {
                    if buffers.push(&text) {
                        if let Some(reply) = conversation.last_mut() {
                            reply.content = buffers.content();
                        }
                        yield conversation.clone();
                    }
                }
                ConverseEvent::MessageStop { stop_reason } => {
                    debug!(model = %model, stop_reason = ?stop_reason, "message stop");
                }
                ConverseEvent::Metadata { input_tokens, output_tokens } => {
                    debug!(model = %model, ?input_tokens, ?output_tokens, "usage");
                }
                ConverseEvent::Other => {}
            }
        }
    };

    Ok(snapshots.boxed())
}

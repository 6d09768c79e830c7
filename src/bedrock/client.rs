//! Converse-stream transport
//!
//! [`ConverseStreamClient`] is the seam between the adapter and the AWS SDK.
//! [`BedrockClient`] is the production implementation; credentials come
//! from the SDK's default provider chain.

use crate::bedrock::request::{ConverseRequest, Turn, TurnRole};
use crate::errors::{LlmError, Result};
use async_stream::try_stream;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ContentBlockDelta, ConversationRole, ConverseStreamOutput,
    InferenceConfiguration, Message as SdkMessage, SystemContentBlock,
};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::debug;

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Event read from a converse stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverseEvent {
    /// Incremental text (`contentBlockDelta.delta.text`)
    ContentBlockDelta { text: String },

    /// The model stopped generating
    MessageStop { stop_reason: Option<String> },

    /// Usage reported after the stop event
    Metadata {
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    },

    /// Any other event (message start, block start/stop, non-text deltas)
    Other,
}

/// Stream of converse events
pub type EventStream = BoxStream<'static, Result<ConverseEvent>>;

/// Opens converse-stream sessions
#[async_trait]
pub trait ConverseStreamClient: Send + Sync {
    /// Open a session; failures to open are returned here, failures while
    /// reading arrive as `Err` items on the stream
    async fn converse_stream(&self, request: &ConverseRequest) -> Result<EventStream>;
}

/// AWS SDK backed converse client
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockClient {
    /// Build a client from the default credential chain for `region`
    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_bedrockruntime::Client::new(&config),
        }
    }

    /// Wrap an already configured SDK client
    pub fn from_sdk_client(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConverseStreamClient for BedrockClient {
    async fn converse_stream(&self, request: &ConverseRequest) -> Result<EventStream> {
        let model = request.model_id.clone();
        let messages = request
            .messages
            .iter()
            .map(|turn| to_sdk_message(&model, turn))
            .collect::<Result<Vec<_>>>()?;
        let system = request
            .system
            .iter()
            .map(|block| SystemContentBlock::Text(block.text.clone()))
            .collect();
        let max_tokens = i32::try_from(request.inference_config.max_tokens).map_err(|_| {
            LlmError::InvalidArgument(format!(
                "max_tokens {} out of range",
                request.inference_config.max_tokens
            ))
        })?;
        let inference = InferenceConfiguration::builder()
            .max_tokens(max_tokens)
            .temperature(request.inference_config.temperature)
            .top_p(request.inference_config.top_p)
            .build();

        debug!(model = %model, turns = request.messages.len(), "opening converse stream");
        let output = self
            .client
            .converse_stream()
            .model_id(&model)
            .set_messages(Some(messages))
            .set_system(Some(system))
            .inference_config(inference)
            .send()
            .await
            .map_err(|e| sdk_error(&model, e))?;

        let mut receiver = output.stream;
        let events = try_stream! {
            while let Some(event) = receiver.recv().await.map_err(|e| sdk_error(&model, e))? {
                yield map_event(event);
            }
        };
        Ok(events.boxed())
    }
}

fn to_sdk_message(model: &str, turn: &Turn) -> Result<SdkMessage> {
    let role = match turn.role {
        TurnRole::User => ConversationRole::User,
        TurnRole::Assistant => ConversationRole::Assistant,
    };
    let content = turn
        .content
        .iter()
        .map(|block| ContentBlock::Text(block.text.clone()))
        .collect();

    SdkMessage::builder()
        .role(role)
        .set_content(Some(content))
        .build()
        .map_err(|e| sdk_error(model, e))
}

fn map_event(event: ConverseStreamOutput) -> ConverseEvent {
    match event {
        ConverseStreamOutput::ContentBlockDelta(delta) => match delta.delta {
            Some(ContentBlockDelta::Text(text)) => ConverseEvent::ContentBlockDelta { text },
            _ => ConverseEvent::Other,
        },
        ConverseStreamOutput::MessageStop(stop) => ConverseEvent::MessageStop {
            stop_reason: Some(stop.stop_reason.as_str().to_string()),
        },
        ConverseStreamOutput::Metadata(metadata) => {
            let usage = metadata.usage;
            ConverseEvent::Metadata {
                input_tokens: usage.as_ref().map(|u| u.input_tokens.max(0) as u64),
                output_tokens: usage.as_ref().map(|u| u.output_tokens.max(0) as u64),
            }
        }
        _ => ConverseEvent::Other,
    }
}

fn sdk_error<E: std::error::Error + 'static>(model: &str, err: E) -> LlmError {
    LlmError::BedrockError {
        model: model.to_string(),
        reason: DisplayErrorContext(err).to_string(),
    }
}

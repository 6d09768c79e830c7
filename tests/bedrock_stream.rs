//! Integration tests for the Bedrock snapshot stream
//!
//! A scripted converse client stands in for the AWS SDK.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use llmstream::bedrock::{
    stream_chat, ChatParams, ConverseEvent, ConverseRequest, ConverseStreamClient, EventStream,
    TEMPERATURE, TOP_P,
};
use llmstream::{LlmError, Message, MessageContent, Result, Role};
use std::sync::Mutex;

const MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Replays a fixed list of events, optionally failing to open
struct ScriptedClient {
    script: Vec<Result<ConverseEvent>>,
    refuse: bool,
    requests: Mutex<Vec<ConverseRequest>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<ConverseEvent>>) -> Self {
        Self {
            script,
            refuse: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn refusing() -> Self {
        Self {
            script: Vec::new(),
            refuse: true,
            requests: Mutex::new(Vec::new()),
        }
    }
}

fn delta(text: &str) -> Result<ConverseEvent> {
    Ok(ConverseEvent::ContentBlockDelta {
        text: text.to_string(),
    })
}

#[async_trait]
impl ConverseStreamClient for ScriptedClient {
    async fn converse_stream(&self, request: &ConverseRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request.clone());
        if self.refuse {
            return Err(LlmError::BedrockError {
                model: request.model_id.clone(),
                reason: "AccessDeniedException".to_string(),
            });
        }

        let events: Vec<Result<ConverseEvent>> = self
            .script
            .iter()
            .map(|item| match item {
                Ok(event) => Ok(event.clone()),
                Err(e) => Err(LlmError::StreamingError(e.to_string())),
            })
            .collect();
        Ok(stream::iter(events).boxed())
    }
}

#[tokio::test]
async fn test_snapshots_grow_in_place() {
    let client = ScriptedClient::new(vec![
        delta("Hel"),
        delta("lo"),
        Ok(ConverseEvent::MessageStop {
            stop_reason: Some("end_turn".to_string()),
        }),
        Ok(ConverseEvent::Metadata {
            input_tokens: Some(9),
            output_tokens: Some(2),
        }),
    ]);
    let history = vec![Message::system("Be brief."), Message::user("Greet me")];

    let snapshots: Vec<Vec<Message>> = stream_chat(&client, history.clone(), &ChatParams::new(MODEL))
        .await
        .unwrap()
        .map(|s| s.unwrap())
        .collect()
        .await;

    assert_eq!(snapshots.len(), 2);
    for snapshot in &snapshots {
        assert_eq!(snapshot.len(), history.len() + 1);
        assert_eq!(&snapshot[..history.len()], &history[..]);
        assert_eq!(snapshot[history.len()].role, Role::Assistant);
    }
    assert_eq!(snapshots[0].last().unwrap().text(), "Hel");
    assert_eq!(snapshots[1].last().unwrap().text(), "Hello");
}

#[tokio::test]
async fn test_request_shape() {
    let client = ScriptedClient::new(vec![delta("ok")]);
    let history = vec![
        Message::system("Be brief."),
        Message::user("one"),
        Message::assistant("two"),
        Message::user("three"),
    ];
    let params = ChatParams::new(MODEL).max_tokens(512);

    let _ = stream_chat(&client, history, &params)
        .await
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model_id, MODEL);
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.system_text(), Some("Be brief."));
    assert_eq!(request.inference_config.max_tokens, 512);
    assert_eq!(request.inference_config.temperature, TEMPERATURE);
    assert_eq!(request.inference_config.top_p, TOP_P);
}

#[tokio::test]
async fn test_candidates_receive_every_delta() {
    let client = ScriptedClient::new(vec![delta("a"), delta(""), delta("b")]);
    let params = ChatParams::new(MODEL).candidates(2);

    let snapshots: Vec<Vec<Message>> = stream_chat(&client, vec![Message::user("x")], &params)
        .await
        .unwrap()
        .map(|s| s.unwrap())
        .collect()
        .await;

    assert_eq!(snapshots.len(), 2);
    assert_eq!(
        snapshots[1].last().unwrap().content,
        MessageContent::Candidates(vec!["ab".to_string(), "ab".to_string()])
    );
}

#[tokio::test]
async fn test_open_failure_is_returned() {
    let client = ScriptedClient::refusing();

    let result = stream_chat(&client, vec![Message::user("x")], &ChatParams::new(MODEL)).await;

    match result {
        Err(LlmError::BedrockError { model, reason }) => {
            assert_eq!(model, MODEL);
            assert_eq!(reason, "AccessDeniedException");
        }
        Err(other) => panic!("Expected BedrockError, got {:?}", other),
        Ok(_) => panic!("Expected BedrockError, got a stream"),
    }
}

#[tokio::test]
async fn test_read_failure_ends_stream() {
    let client = ScriptedClient::new(vec![
        delta("partial"),
        Err(LlmError::StreamingError("connection reset".to_string())),
        delta("never seen"),
    ]);

    let items: Vec<_> = stream_chat(&client, vec![Message::user("x")], &ChatParams::new(MODEL))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().last().unwrap().text(), "partial");
    assert!(matches!(&items[1], Err(LlmError::StreamingError(msg)) if msg.contains("connection reset")));
}

#[tokio::test]
async fn test_missing_stop_event() {
    let client = ScriptedClient::new(vec![delta("no stop")]);

    let snapshots: Vec<_> = stream_chat(&client, vec![Message::user("x")], &ChatParams::new(MODEL))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(snapshots.len(), 1);
    assert!(snapshots[0].is_ok());
}

#[tokio::test]
async fn test_zero_candidates_rejected_before_call() {
    let client = ScriptedClient::new(vec![delta("x")]);
    let params = ChatParams::new(MODEL).candidates(0);

    let result = stream_chat(&client, vec![Message::user("x")], &params).await;

    assert!(matches!(result, Err(LlmError::InvalidArgument(_))));
    assert!(client.requests.lock().unwrap().is_empty());
}

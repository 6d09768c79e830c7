//! Integration tests for the Ollama adapter using wiremock.
//!
//! Runs against a mock daemon; no Ollama install required.

use futures_util::StreamExt;
use llmstream::ollama::{
    ChatRequest, GenerateRequest, GenerationOptions, OllamaClient, PullProgress, StreamItem,
};
use llmstream::{LlmError, Message, Role};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "qwen2.5-coder:3b";

fn ndjson(lines: &[serde_json::Value]) -> String {
    lines
        .iter()
        .map(|l| format!("{}\n", l))
        .collect::<String>()
}

async fn client_for(server: &MockServer) -> OllamaClient {
    OllamaClient::with_base_url(&server.uri()).unwrap()
}

#[tokio::test]
async fn test_generate_stream_fragments_then_done() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        json!({"model": MODEL, "response": "Hello", "done": false}),
        json!({"model": MODEL, "response": " world", "done": false}),
        json!({
            "model": MODEL, "response": "", "done": true, "done_reason": "stop",
            "total_duration": 900000000u64, "load_duration": 1000000u64,
            "prompt_eval_count": 8, "prompt_eval_duration": 20000000u64,
            "eval_count": 12, "eval_duration": 600000000u64
        }),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": MODEL, "prompt": "Say hello", "stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = GenerateRequest::new(MODEL, "Say hello");
    let items: Vec<StreamItem> = client
        .generate_stream(&request)
        .await
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0], StreamItem::Fragment("Hello".to_string()));
    assert_eq!(items[1], StreamItem::Fragment(" world".to_string()));
    match &items[2] {
        StreamItem::Done(completion) => {
            assert_eq!(completion.full_response, "Hello world");
            assert_eq!(completion.stats.eval_count, Some(12));
            assert_eq!(completion.stats.prompt_eval_count, Some(8));
            assert_eq!(completion.stats.done_reason.as_deref(), Some("stop"));
            assert!(completion.message.is_none());
        }
        other => panic!("Expected Done, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_stream_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model runner crashed"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .generate_stream(&GenerateRequest::new(MODEL, "hi"))
        .await;

    match result {
        Err(LlmError::StatusError { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model runner crashed");
        }
        Err(other) => panic!("Expected StatusError, got {:?}", other),
        Ok(_) => panic!("Expected StatusError, got a stream"),
    }
}

#[tokio::test]
async fn test_generate_blocking_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "stream": false,
            "system": "Answer in one word.",
            "options": {"num_predict": 16}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": MODEL, "response": "Rayleigh", "done": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = GenerateRequest::new(MODEL, "Why is the sky blue?")
        .system("Answer in one word.")
        .options(GenerationOptions::default().num_predict(16));

    assert_eq!(client.generate(&request).await.unwrap(), "Rayleigh");
}

#[tokio::test]
async fn test_chat_blocking_returns_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "stream": false,
            "messages": [{"role": "user", "content": "ping"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": MODEL,
            "message": {"role": "assistant", "content": "pong"},
            "done": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let message = client
        .chat(&ChatRequest::new(MODEL, vec![Message::user("ping")]))
        .await
        .unwrap();

    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.text(), "pong");
}

#[tokio::test]
async fn test_chat_stream_assembles_message() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        json!({"message": {"role": "assistant", "content": "po"}, "done": false}),
        json!({"message": {"role": "assistant", "content": "ng"}, "done": false}),
        json!({"message": {"role": "assistant", "content": ""}, "done": true, "eval_count": 2}),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let items: Vec<StreamItem> = client
        .chat_stream(&ChatRequest::new(MODEL, vec![Message::user("ping")]))
        .await
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    match items.last() {
        Some(StreamItem::Done(completion)) => {
            assert_eq!(completion.message, Some(Message::assistant("pong")));
        }
        other => panic!("Expected Done, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": MODEL,
                "modified_at": "2024-11-12T10:00:00Z",
                "size": 1929912432u64,
                "digest": "e7149271c348",
                "details": {"parameter_size": "3.1B", "quantization_level": "Q4_K_M"}
            }]
        })))
        .mount(&server)
        .await;

    let models = client_for(&server).await.list_models().await.unwrap();

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, MODEL);
    assert_eq!(models[0].description(), "3.1B Q4_K_M");
}

#[tokio::test]
async fn test_list_models_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 page not found"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.list_models().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("404 page not found"));
}

#[tokio::test]
async fn test_embeddings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({"model": "nomic-embed-text", "prompt": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.25, -0.5, 1.0]
        })))
        .mount(&server)
        .await;

    let embedding = client_for(&server)
        .await
        .embeddings("nomic-embed-text", "hello")
        .await
        .unwrap();

    assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn test_pull_model_progress() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        json!({"status": "pulling manifest"}),
        json!({"status": "pulling e7149271c348", "digest": "sha256:e7149271c348", "total": 200, "completed": 50}),
        json!({"status": "success"}),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({"name": MODEL})))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let records: Vec<PullProgress> = client_for(&server)
        .await
        .pull_model(MODEL)
        .await
        .unwrap()
        .map(|p| p.unwrap())
        .collect()
        .await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].describe(), "Status: pulling manifest");
    assert_eq!(records[1].describe(), "Progress: 25.00% - pulling e7149271c348");
    assert!(records[2].is_success());
}

#[tokio::test]
async fn test_pull_model_error_event() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        json!({"status": "pulling manifest"}),
        json!({"error": "pull model manifest: file does not exist"}),
    ]);
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let records: Vec<_> = client_for(&server)
        .await
        .pull_model("no-such-model")
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(records.len(), 2);
    assert!(records[0].is_ok());
    assert!(matches!(&records[1], Err(LlmError::StreamingError(msg)) if msg.contains("does not exist")));
}

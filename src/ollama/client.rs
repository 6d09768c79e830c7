//! Ollama API client
//!
//! HTTP client for a local Ollama daemon:
//! - Streaming: POST /api/generate, POST /api/chat (NDJSON bodies)
//! - Blocking variants of both returning the finished text or message
//! - Model management: GET /api/tags, POST /api/pull
//! - Embeddings: POST /api/embeddings
//!
//! No timeout is set on the underlying client; long generations and
//! model downloads run until the daemon closes the body.

use crate::errors::{LlmError, Result};
use crate::ollama::options::{ChatRequest, GenerateRequest};
use crate::ollama::stream::{generation_stream, pull_stream, StreamMode};
use crate::ollama::types::{
    ChatResponse, EmbeddingResponse, GenerateResponse, ModelInfo, ModelsResponse, PullProgress,
    StreamItem,
};
use crate::types::Message;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:3b";

/// Stream of generate or chat items
pub type ItemStream = BoxStream<'static, Result<StreamItem>>;

/// Stream of pull progress records
pub type PullStream = BoxStream<'static, Result<PullProgress>>;

/// Request body with the `stream` flag set by the client
#[derive(Serialize)]
struct WithStream<'a, T> {
    #[serde(flatten)]
    request: &'a T,
    stream: bool,
}

/// Ollama HTTP client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create new Ollama client for the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create Ollama client for a custom endpoint
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder().build().map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and fail on any non-success status
    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        check_status(response).await
    }

    /// List installed models
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.url("/api/tags");
        debug!(url = %url, "GET");

        let response = check_status(self.client.get(&url).send().await?).await?;
        let models: ModelsResponse = response.json().await?;
        Ok(models.models)
    }

    /// Generate a response and return only its text
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let body = WithStream {
            request,
            stream: false,
        };
        let response = self.post("/api/generate", &body).await?;
        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }

    /// Generate a response as a stream of fragments and a final record
    ///
    /// A non-success status fails here, before any item is produced.
    pub async fn generate_stream(&self, request: &GenerateRequest) -> Result<ItemStream> {
        debug!(model = %request.model, "opening generate stream");
        let body = WithStream {
            request,
            stream: true,
        };
        let response = self.post("/api/generate", &body).await?;
        Ok(generation_stream(response.bytes_stream(), StreamMode::Generate).boxed())
    }

    /// Run a chat turn and return the assistant message
    pub async fn chat(&self, request: &ChatRequest) -> Result<Message> {
        let body = WithStream {
            request,
            stream: false,
        };
        let response = self.post("/api/chat", &body).await?;
        let chat: ChatResponse = response.json().await?;
        Ok(chat.message)
    }

    /// Run a chat turn as a stream of fragments and a final record
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ItemStream> {
        debug!(model = %request.model, turns = request.messages.len(), "opening chat stream");
        let body = WithStream {
            request,
            stream: true,
        };
        let response = self.post("/api/chat", &body).await?;
        Ok(generation_stream(response.bytes_stream(), StreamMode::Chat).boxed())
    }

    /// Fetch the embedding vector for a prompt
    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f64>> {
        let body = json!({ "model": model, "prompt": prompt });
        let response = self.post("/api/embeddings", &body).await?;
        let embedding: EmbeddingResponse = response.json().await?;
        Ok(embedding.embedding)
    }

    /// Pull (download) a model, streaming progress records
    pub async fn pull_model(&self, name: &str) -> Result<PullStream> {
        debug!(model = %name, "pulling model");
        let body = json!({ "name": name });
        let response = self.post("/api/pull", &body).await?;
        Ok(pull_stream(response.bytes_stream()).boxed())
    }
}

/// Turn a non-success response into [`LlmError::StatusError`] with its body
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(LlmError::StatusError {
        status: status.as_u16(),
        body,
    })
}

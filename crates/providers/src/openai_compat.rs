//! OpenAI-compatible chat and embedding clients.
//!
//! Works with: OpenAI, Azure OpenAI deployments, and any endpoint exposing
//! `/chat/completions` and `/embeddings` in the OpenAI wire format.

use async_trait::async_trait;
use dualchat_core::error::{CompletionError, EmbeddingError};
use dualchat_core::message::Role;
use dualchat_core::provider::{ChatModel, Completion, CompletionRequest, Embedder, Usage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{self, Endpoint, HttpFailure};

/// A hosted chat-completion model behind an OpenAI-style endpoint.
pub struct OpenAiChatModel {
    name: String,
    endpoint: Endpoint,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiChatModel {
    pub fn new(name: impl Into<String>, endpoint: Endpoint, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 1024,
            client: http::client(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Flatten a request into the OpenAI message list:
    /// system persona, prior turns, then the user prompt.
    fn to_api_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);

        if let Some(system) = &request.system_prompt {
            messages.push(ApiMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }

        messages.extend(request.history.iter().map(|m| ApiMessage {
            role: m.role.as_str().into(),
            content: m.content.clone(),
        }));

        messages.push(ApiMessage {
            role: Role::User.as_str().into(),
            content: request.prompt.clone(),
        });

        messages
    }

    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(request),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let url = self.endpoint.url(&self.model, "chat/completions");
        let body = self.request_body(&request);

        debug!(
            provider = %self.name,
            model = %self.model,
            history = request.history.len(),
            "Sending completion request"
        );

        let response = self
            .endpoint
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::network)?;
        let response = http::check(response).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| {
                CompletionError::MalformedResponse(format!("Failed to parse response: {e}"))
            })?;

        parse_completion(api_response)
    }
}

fn parse_completion(api_response: ApiResponse) -> Result<Completion, CompletionError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("No choices in response".into()))?;

    Ok(Completion {
        text: choice.message.content.unwrap_or_default(),
        model: api_response.model,
        usage: api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

/// A hosted embedding model behind an OpenAI-style endpoint.
pub struct OpenAiEmbedder {
    name: String,
    endpoint: Endpoint,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(name: impl Into<String>, endpoint: Endpoint, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint,
            model: model.into(),
            client: http::client(),
        }
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = self.endpoint.url(&self.model, "embeddings");
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %self.model,
            count = inputs.len(),
            "Sending embedding request"
        );

        let response = self
            .endpoint
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::network)?;
        let response = http::check(response).await?;

        let api_resp: EmbeddingApiResponse = response.json().await.map_err(|e| {
            EmbeddingError::MalformedResponse(format!("Failed to parse embedding response: {e}"))
        })?;

        parse_embeddings(api_resp, inputs.len())
    }
}

/// Order vectors by their `index` and check one came back per input.
fn parse_embeddings(
    api_resp: EmbeddingApiResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut data = api_resp.data;
    data.sort_by_key(|d| d.index);

    if data.len() != expected {
        return Err(EmbeddingError::MalformedResponse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::MalformedResponse("empty embedding list".into()))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}

// --- API wire types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

//! Model-invocation boundary
//!
//! `ModelClient` is the seam between the advisor and whatever produces text.
//! `GroqClient` talks to an OpenAI-compatible chat completions endpoint and
//! de-streams the server-sent events into one string.

use crate::config::Settings;
use crate::error::AdvisorError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info};

/// Sampling parameters for one model call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Free-text budget report
    pub fn report(prompt: String) -> Self {
        Self {
            prompt,
            temperature: 0.6,
            top_p: 0.95,
            max_tokens: 1024,
        }
    }

    /// Chart payload; deterministic sampling
    pub fn charts(prompt: String) -> Self {
        Self {
            prompt,
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 1024,
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Return the full response text for a prompt
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

//
// ================= Groq =================
//

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.groq_api_key.clone(),
            settings.base_url.clone(),
            settings.model.clone(),
            settings.model_timeout,
        )
    }
}

#[async_trait]
impl ModelClient for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AdvisorError::Llm("GROQ_API_KEY not configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            top_p: request.top_p,
            max_completion_tokens: request.max_tokens,
            stream: true,
        };

        info!(model = %self.model, temperature = request.temperature, "Calling model API");

        let mut response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Model API request failed: {}", e);
                AdvisorError::Llm(format!("Model API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Model API error response: {}", error_text);
            return Err(AdvisorError::Llm(format!(
                "Model API error ({}): {}",
                status, error_text
            )));
        }

        let mut accumulator = SseAccumulator::default();
        while let Some(chunk) = response.chunk().await? {
            accumulator.push(&chunk);
            if accumulator.is_done() {
                break;
            }
        }

        let text = accumulator.finish();
        info!(chars = text.len(), "Model response received");

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

//
// ================= Stream Decoding =================
//

/// Concatenates `choices[0].delta.content` across server-sent event lines.
/// Bytes may arrive split anywhere; only complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseAccumulator {
    pending: Vec<u8>,
    content: String,
    done: bool,
}

impl SseAccumulator {
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.consume_line(&String::from_utf8_lossy(&line));
        }
    }

    /// True once `data: [DONE]` has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn finish(mut self) -> String {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.consume_line(&String::from_utf8_lossy(&tail));
        }
        self.content
    }

    fn consume_line(&mut self, line: &str) {
        if self.done {
            return;
        }

        let Some(data) = line.trim().strip_prefix("data:") else {
            return;
        };
        let data = data.trim();

        if data == "[DONE]" {
            self.done = true;
            return;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                if let Some(content) = chunk.choices.first().and_then(|c| c.delta.content.as_deref()) {
                    self.content.push_str(content);
                }
            }
            Err(e) => debug!(error = %e, "Skipping unparseable stream line"),
        }
    }
}

//
// ================= Static Model =================
//

/// Fixed-response model for tests and offline runs
pub struct StaticModel {
    response: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StaticModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for StaticModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.response.clone())
    }
}

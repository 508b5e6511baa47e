//! Text-completion backend: the `TextGenerator` capability and a minimal
//! OpenAI-compatible chat.completions client implementing it.
//!
//! Callers only ever see `generate(prompt) -> text`; the quiz and the game each
//! get their own `ChatModel` so they can use different models.
//!
//! NOTE: We never log the API key or prompt contents, only sizes and latencies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::GenerateError;

/// Opaque, fallible text completion. Injected into `AppState` so tests can
/// substitute a deterministic stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

  /// Model label for logs.
  fn model(&self) -> &str;
}

/// Shared HTTP client + credentials. Cheap to clone.
#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
}

/// One model bound to the shared client.
#[derive(Clone)]
pub struct ChatModel {
  api: OpenAI,
  model: String,
  temperature: f32,
}

/// The two generators the app needs, built from the environment.
pub struct Generators {
  pub quiz: ChatModel,
  pub game: ChatModel,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    match Self::new(api_key, base_url) {
      Ok(oa) => Some(oa),
      Err(e) => {
        error!(target: "quizbench", error = %e, "Failed to build HTTP client for OpenAI");
        None
      }
    }
  }

  pub fn new(api_key: String, base_url: String) -> Result<Self, GenerateError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()?;
    Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string() })
  }

  pub fn model(&self, model: impl Into<String>, temperature: f32) -> ChatModel {
    ChatModel { api: self.clone(), model: model.into(), temperature }
  }

  /// Plain-text chat completion with a single user message.
  #[instrument(level = "info", skip(self, model, prompt), fields(model = %model, prompt_len = prompt.len()))]
  async fn chat_plain(&self, model: &str, prompt: &str, temperature: f32) -> Result<String, GenerateError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![ChatMessageReq { role: "user".into(), content: prompt.into() }],
      temperature,
      max_tokens: None,
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "quizbench/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(GenerateError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    if text.is_empty() {
      return Err(GenerateError::Empty);
    }
    Ok(text)
  }
}

impl Generators {
  /// Quiz grading/help defaults to the fast model, similarity judgement to the strong one.
  pub fn from_env() -> Option<Self> {
    let api = OpenAI::from_env()?;
    let quiz_model = std::env::var("OPENAI_QUIZ_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let game_model = std::env::var("OPENAI_GAME_MODEL").unwrap_or_else(|_| "gpt-4o".into());
    Some(Self {
      quiz: api.model(quiz_model, 0.2),
      game: api.model(game_model, 0.2),
    })
  }
}

#[async_trait]
impl TextGenerator for ChatModel {
  async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
    let start = Instant::now();
    let result = self.api.chat_plain(&self.model, prompt, self.temperature).await;
    let elapsed = start.elapsed();
    match &result {
      Ok(text) => info!(model = %self.model, ?elapsed, reply_len = text.len(), "Model response received"),
      Err(e) => error!(model = %self.model, ?elapsed, error = %e, "Model call failed"),
    }
    result
  }

  fn model(&self) -> &str {
    &self.model
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

//! Test support: a scripted `TextGenerator` and a small deterministic app state.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Prompts, Settings};
use crate::domain::{ContentKind, GameContentItem};
use crate::error::GenerateError;
use crate::openai::TextGenerator;
use crate::quiz::tests::bank;
use crate::state::AppState;

/// Replays canned replies in order and records every prompt it was given.
pub struct ScriptedGenerator {
  replies: Mutex<VecDeque<Result<String, GenerateError>>>,
  always_fail: bool,
  delay: Option<Duration>,
  seen: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
  pub fn new(replies: Vec<Result<String, GenerateError>>) -> Arc<Self> {
    Arc::new(Self {
      replies: Mutex::new(replies.into()),
      always_fail: false,
      delay: None,
      seen: Mutex::new(Vec::new()),
    })
  }

  /// Like `new`, but every reply takes `delay` to arrive.
  pub fn delayed(replies: Vec<Result<String, GenerateError>>, delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      replies: Mutex::new(replies.into()),
      always_fail: false,
      delay: Some(delay),
      seen: Mutex::new(Vec::new()),
    })
  }

  pub fn failing() -> Arc<Self> {
    Arc::new(Self {
      replies: Mutex::new(VecDeque::new()),
      always_fail: true,
      delay: None,
      seen: Mutex::new(Vec::new()),
    })
  }

  pub fn prompts(&self) -> Vec<String> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
  async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
    self.seen.lock().unwrap().push(prompt.to_string());
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if self.always_fail {
      return Err(GenerateError::Status { status: 503, message: "backend down".into() });
    }
    self.replies.lock().unwrap().pop_front().unwrap_or(Err(GenerateError::Empty))
  }

  fn model(&self) -> &str {
    "scripted"
  }
}

pub fn game_items() -> Vec<GameContentItem> {
  ["g1", "g2"]
    .iter()
    .map(|id| GameContentItem {
      id: id.to_string(),
      kind: ContentKind::Text,
      original_prompt: format!("Prompt {id}"),
      output: format!("Output for {id}"),
    })
    .collect()
}

/// Five questions (ids 1..=5), two game items, default prompts.
pub fn state_with(quiz: Option<Arc<ScriptedGenerator>>, game: Option<Arc<ScriptedGenerator>>) -> AppState {
  state_with_settings(quiz, game, &Settings::default())
}

pub fn state_with_settings(
  quiz: Option<Arc<ScriptedGenerator>>,
  game: Option<Arc<ScriptedGenerator>>,
  settings: &Settings,
) -> AppState {
  AppState::with_parts(
    bank(5),
    game_items(),
    Prompts::default(),
    quiz.map(|g| g as Arc<dyn TextGenerator>),
    game.map(|g| g as Arc<dyn TextGenerator>),
    settings,
  )
}

//! Configuration: process settings from the environment and the optional TOML
//! content file (prompt templates + question bank + game content).
//!
//! See `QuizConfig` and `Prompts` for the expected TOML schema.

use std::{collections::HashSet, time::Duration};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{GameContentItem, Question};
use crate::error::ConfigError;

const DEV_SESSION_SECRET: &str = "quizbench-dev-secret-change-me";

/// Process-level settings read once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub session_secret: String,
  pub session_idle: Duration,
  pub static_dir: String,
}

impl Settings {
  pub fn from_env() -> Self {
    let port = std::env::var("PORT")
      .ok()
      .and_then(|p| p.parse::<u16>().ok())
      .unwrap_or(5000);

    let session_secret = match std::env::var("SESSION_SECRET") {
      Ok(s) if !s.is_empty() => s,
      _ => {
        warn!(target: "quizbench", "SESSION_SECRET not set; using the development secret");
        DEV_SESSION_SECRET.to_string()
      }
    };

    let idle_minutes = std::env::var("SESSION_IDLE_MINUTES")
      .ok()
      .and_then(|m| m.parse::<u64>().ok())
      .unwrap_or(120);

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());

    Self {
      port,
      session_secret,
      session_idle: Duration::from_secs(idle_minutes * 60),
      static_dir,
    }
  }
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      port: 5000,
      session_secret: DEV_SESSION_SECRET.to_string(),
      session_idle: Duration::from_secs(120 * 60),
      static_dir: "./static".into(),
    }
  }
}

pub const DEFAULT_LOG_FILTER: &str = "info,quiz=debug,game=debug,quizbench=debug,tower_http=info,axum=info";

/// Log output shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

/// Logging settings, read before anything else so startup is traced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
  pub filter: String,
  pub format: LogFormat,
}

impl LogSettings {
  pub fn from_env() -> Self {
    Self::from_values(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
  }

  /// Blank LOG_LEVEL means the default filter; LOG_FORMAT is case-insensitive.
  pub fn from_values(level: Option<String>, format: Option<String>) -> Self {
    let filter = level
      .map(|l| l.trim().to_string())
      .filter(|l| !l.is_empty())
      .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let format = match format.as_deref().map(str::trim) {
      Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    };
    Self { filter, format }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub questions: Vec<Question>,
  #[serde(default)]
  pub game_content: Vec<GameContentItem>,
}

/// Prompt templates sent to the text-completion backend.
/// Placeholders are `{name}` and are filled with `util::fill_template`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Placeholders: question, answer, user_answer
  pub grading_template: String,
  /// Placeholders: question, answer, help_question
  pub help_template: String,
  /// Placeholders: kind, context, original_prompt, user_guess
  pub similarity_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      grading_template: r#"Task: Evaluate if the user's answer to the quiz question is correct. Be precise.
Question: {question}
Correct Answer: {answer}
User's Answer: {user_answer}
Instructions:
1. Compare the user's answer to the correct answer to see if they are semantically equivalent and address the question accurately. Do not just look for keyword matches. Consider the meaning. If the user's answer is correct but has a spelling error, still treat it as correct and respond with: "Correct! [spelling error, Correct spelling: '{answer}']".
2. If the user's answer is essentially the same as the correct answer in meaning and accurately answers the question, respond with ONLY the word: "Correct!".
3. If the user's answer is incorrect, does not answer the question, or is irrelevant, respond with: "Incorrect. The correct answer is: '{answer}'. [Concise explanation of why the user was wrong and what the correct concept is]."
4. Keep explanations very concise and directly related to the question and answer.
5. Do not include any text outside of the answer evaluation.
Response:"#.into(),
      help_template: r#"Context: User is asking for help on a quiz question.
Original Quiz Question: {question}
Correct Answer (for context, do not reveal directly): {answer}
User's Help Request: {help_question}
Task: Answer the user's request concisely, clarifying concepts related to the quiz question without giving the answer away. Be helpful and encouraging.
Response:"#.into(),
      similarity_template: r#"Task: Evaluate similarity between "User's Guessed Prompt" and "Original Prompt" for the given "AI Output Context".
AI Output Context ({kind}): {context}
Original Prompt: {original_prompt}
User's Guessed Prompt: {user_guess}
Instructions: Respond ONLY in the format `Similarity: [Rating]. Explanation: [Brief Explanation]`. Ratings: "Very Similar", "Somewhat Similar", "Not Similar".
Response:"#.into(),
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any IO/parse/validation error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  load_quiz_config(&path)
}

/// Read and validate a TOML content file. Errors are logged and yield None so
/// the caller falls back to the built-in content.
pub fn load_quiz_config(path: &str) -> Option<QuizConfig> {
  let loaded = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Io { path: path.to_string(), source })
    .and_then(|s| parse_quiz_config(&s));
  match loaded {
    Ok(cfg) => {
      info!(target: "quizbench", %path, questions = cfg.questions.len(), game_items = cfg.game_content.len(), "Loaded quiz config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "quizbench", %path, error = %e, "Ignoring quiz config; using built-in content");
      None
    }
  }
}

pub fn parse_quiz_config(s: &str) -> Result<QuizConfig, ConfigError> {
  let cfg = toml::from_str::<QuizConfig>(s)?;
  cfg.validate()?;
  Ok(cfg)
}

impl QuizConfig {
  /// Question ids and game content ids must each be unique.
  fn validate(&self) -> Result<(), ConfigError> {
    let mut question_ids = HashSet::new();
    if let Some(q) = self.questions.iter().find(|q| !question_ids.insert(q.id)) {
      return Err(ConfigError::DuplicateQuestionId(q.id));
    }
    let mut content_ids = HashSet::new();
    if let Some(item) = self.game_content.iter().find(|i| !content_ids.insert(i.id.as_str())) {
      return Err(ConfigError::DuplicateContentId(item.id.clone()));
    }
    Ok(())
  }
}

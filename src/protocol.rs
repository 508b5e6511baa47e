//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names match what the browser scripts read, keep them stable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{GameContentItem, SimilarityTier};
use crate::error::ApiError;

/// Counters shown in the progress bar.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Progress {
    pub completed_questions: usize,
    pub total_questions: usize,
    pub correct_answers: u32,
    pub total_attempts: u32,
}

/// Current question without hint or answer.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: u32,
    pub question: String,
    pub question_number: usize,
    #[serde(flatten)]
    pub progress: Progress,
}

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    #[serde(default)]
    pub next: Option<String>,
}

impl QuestionQuery {
    pub fn wants_next(&self) -> bool {
        self.next.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AnswerIn {
    #[serde(default)]
    pub question_id: Option<Value>,
    #[serde(default)]
    pub user_answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub is_correct: bool,
    pub chatbot_feedback: String,
    pub correct_answer: String,
    #[serde(flatten)]
    pub progress: Progress,
}

#[derive(Debug, Deserialize, Default)]
pub struct HintIn {
    #[serde(default)]
    pub question_id: Option<Value>,
}
#[derive(Debug, Serialize)]
pub struct HintOut {
    pub hint: String,
    pub question_id: u32,
}

#[derive(Debug, Deserialize, Default)]
pub struct HelpIn {
    #[serde(default)]
    pub help_question: Option<String>,
    #[serde(default)]
    pub question_id: Option<Value>,
}
#[derive(Debug, Serialize)]
pub struct HelpOut {
    pub chatbot_response: String,
}

#[derive(Debug, Serialize)]
pub struct ResetOut {
    pub success: bool,
    pub message: String,
    pub total_questions: usize,
}

/// Game item as shown to the player: the source prompt stays on the server.
#[derive(Debug, Serialize)]
pub struct GameContentOut {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub output: String,
}

impl From<&GameContentItem> for GameContentOut {
    fn from(item: &GameContentItem) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind.as_str(),
            output: item.output.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct GuessIn {
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub user_guess: Option<String>,
}
#[derive(Debug, Serialize)]
pub struct GuessOut {
    pub similarity: SimilarityTier,
    pub feedback: String,
    pub original_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub ai_enabled: bool,
    pub questions: usize,
    pub active_sessions: usize,
}

/// Accept a question id sent either as a JSON integer or a numeric string.
pub fn parse_question_id(raw: Option<&Value>) -> Result<u32, ApiError> {
    let invalid = || ApiError::InvalidInput("Invalid question ID".into());
    match raw {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Trimmed, non-empty text or `InvalidInput(msg)`.
pub fn required_text(raw: Option<&str>, msg: &str) -> Result<String, ApiError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ApiError::InvalidInput(msg.to_string())),
    }
}

//! Domain models: quiz questions and the guess-the-prompt game content.

use serde::{Deserialize, Serialize};

/// A single quiz question. `answer` is the expected answer handed to the grader,
/// never sent to the browser before submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub id: u32,
  pub question: String,
  pub answer: String,
  #[serde(default)] pub hint: Option<String>,
}

/// What kind of output a game item shows. Only text today.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
  #[default]
  Text,
}

impl ContentKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ContentKind::Text => "text",
    }
  }
}

/// A generated output together with the prompt that produced it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameContentItem {
  pub id: String,
  #[serde(rename = "type", default)]
  pub kind: ContentKind,
  pub original_prompt: String,
  pub output: String,
}

/// Similarity rating returned by the prompt-guess evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SimilarityTier {
  #[serde(rename = "Very Similar")]
  VerySimilar,
  #[serde(rename = "Somewhat Similar")]
  SomewhatSimilar,
  #[serde(rename = "Not Similar")]
  NotSimilar,
  #[serde(rename = "unknown")]
  Unknown,
}

impl SimilarityTier {
  /// Parse one of the three recognised labels. Anything else is `None`, never a guess.
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "Very Similar" => Some(SimilarityTier::VerySimilar),
      "Somewhat Similar" => Some(SimilarityTier::SomewhatSimilar),
      "Not Similar" => Some(SimilarityTier::NotSimilar),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      SimilarityTier::VerySimilar => "Very Similar",
      SimilarityTier::SomewhatSimilar => "Somewhat Similar",
      SimilarityTier::NotSimilar => "Not Similar",
      SimilarityTier::Unknown => "unknown",
    }
  }
}

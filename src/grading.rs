//! Answer grading: prompt construction and interpretation of the backend reply.
//!
//! The backend is told to answer with `Correct!` or `Incorrect. ...`. Only an
//! explicit `Correct!` prefix counts as correct; everything else is incorrect.

use crate::config::Prompts;
use crate::domain::Question;
use crate::util::fill_template;

pub const CORRECT_MARKER: &str = "Correct!";
pub const INCORRECT_MARKER: &str = "Incorrect.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
  pub is_correct: bool,
  pub feedback: String,
}

pub fn build_grading_prompt(prompts: &Prompts, question: &Question, user_answer: &str) -> String {
  fill_template(
    &prompts.grading_template,
    &[
      ("question", question.question.as_str()),
      ("answer", question.answer.as_str()),
      ("user_answer", user_answer),
    ],
  )
}

/// Classify a raw reply by its literal prefix.
pub fn parse_verdict(raw: &str, expected_answer: &str) -> Verdict {
  let reply = raw.trim();
  if reply.starts_with(CORRECT_MARKER) {
    Verdict { is_correct: true, feedback: reply.to_string() }
  } else if reply.starts_with(INCORRECT_MARKER) {
    Verdict { is_correct: false, feedback: reply.to_string() }
  } else {
    Verdict {
      is_correct: false,
      feedback: format!(
        "Incorrect. The correct answer is: '{}'. (AI response format unexpected)",
        expected_answer
      ),
    }
  }
}

/// What the player sees when the backend call itself failed.
pub fn degraded_verdict(expected_answer: &str) -> Verdict {
  Verdict {
    is_correct: false,
    feedback: format!(
      "Incorrect. The correct answer is: '{}'. AI evaluation unavailable.",
      expected_answer
    ),
  }
}

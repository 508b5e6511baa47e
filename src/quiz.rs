//! Per-user quiz state and the operations that drive it.
//!
//! State machine:
//!   FRESH -> fetch -> SERVING(k) -> advance -> SERVING(k+1) -> ...
//!   a fetch with `cursor >= len` reshuffles and serves from 0 again.
//!   `reset` goes back to FRESH from anywhere.
//!
//! Fetching never moves the cursor, so reloading a page re-serves the same question.

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::domain::Question;
use crate::error::ApiError;
use crate::protocol::{Progress, QuestionView};

pub const NO_HINT: &str = "No hint available.";

#[derive(Clone, Debug)]
pub struct QuizState {
  working_questions: Vec<Question>,
  cursor: usize,
  answered_ids: BTreeSet<u32>,
  correct_count: u32,
  attempt_count: u32,
}

impl QuizState {
  /// A freshly shuffled copy of `bank` with zeroed counters.
  pub fn fresh<R: Rng + ?Sized>(bank: &[Question], rng: &mut R) -> Self {
    let mut working_questions = bank.to_vec();
    working_questions.shuffle(rng);
    Self {
      working_questions,
      cursor: 0,
      answered_ids: BTreeSet::new(),
      correct_count: 0,
      attempt_count: 0,
    }
  }

  /// Question at the cursor (hint stripped) plus progress.
  /// Wraps and reshuffles first when the cursor ran past the end.
  pub fn current_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<QuestionView, ApiError> {
    if self.working_questions.is_empty() {
      return Err(ApiError::NotFound("No questions available".into()));
    }
    if self.cursor >= self.working_questions.len() {
      debug!(target: "quiz", total = self.working_questions.len(), "Cycling questions");
      self.working_questions.shuffle(rng);
      self.cursor = 0;
    }
    let q = &self.working_questions[self.cursor];
    Ok(QuestionView {
      id: q.id,
      question: q.question.clone(),
      question_number: self.cursor + 1,
      progress: self.progress(),
    })
  }

  /// Move to the next question. Bounds are checked on the next fetch.
  pub fn advance(&mut self) {
    self.cursor += 1;
  }

  /// Linear lookup in the working set (not the static bank).
  pub fn find(&self, question_id: u32) -> Option<&Question> {
    self.working_questions.iter().find(|q| q.id == question_id)
  }

  pub fn hint(&self, question_id: u32) -> Result<String, ApiError> {
    let q = self
      .find(question_id)
      .ok_or_else(|| ApiError::NotFound("Question not found in session".into()))?;
    Ok(q.hint.clone().unwrap_or_else(|| NO_HINT.to_string()))
  }

  /// Book-keeping for a well-formed submission: the id joins the answered set
  /// (no-op if already there) and the attempt counter always moves.
  pub fn record_attempt(&mut self, question_id: u32) {
    self.answered_ids.insert(question_id);
    self.attempt_count += 1;
  }

  pub fn record_correct(&mut self) {
    self.correct_count += 1;
  }

  pub fn progress(&self) -> Progress {
    Progress {
      completed_questions: self.answered_ids.len(),
      total_questions: self.working_questions.len(),
      correct_answers: self.correct_count,
      total_attempts: self.attempt_count,
    }
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn len(&self) -> usize {
    self.working_questions.len()
  }
}

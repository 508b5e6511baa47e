//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - serving/advancing/resetting the per-session quiz
//!   - grading answers through the quiz generator and folding the verdict back
//!   - the help assistant
//!   - the guess-the-prompt game
//!
//! The session lock is never held across a backend call.

use tracing::{debug, error, info, instrument, warn};

use crate::domain::Question;
use crate::error::ApiError;
use crate::grading::{build_grading_prompt, degraded_verdict, parse_verdict, Verdict};
use crate::guess::{build_similarity_prompt, failed_evaluation, parse_similarity};
use crate::protocol::*;
use crate::session::SessionId;
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};

pub const HELP_FALLBACK: &str = "Sorry, I couldn't get help from the AI assistant.";

/// Feature names used in the 503 message when the quiz generator is missing.
pub const GRADING_FEATURE: &str = "checking answers";
pub const HELP_FEATURE: &str = "providing help";

/// Result of a submission. `upstream_failed` marks a degraded verdict.
#[derive(Debug)]
pub struct Graded {
  pub out: AnswerOut,
  pub upstream_failed: bool,
}

#[instrument(level = "info", skip(state), fields(session = %sid.0))]
pub async fn get_question(state: &AppState, sid: &SessionId, next: bool) -> Result<QuestionView, ApiError> {
  state
    .sessions
    .with_session(sid, |quiz| {
      if next {
        quiz.advance();
        debug!(target: "quiz", cursor = quiz.cursor(), "Advanced to next question");
      }
      quiz.current_question(&mut rand::thread_rng())
    })
    .await
}

pub async fn get_progress(state: &AppState, sid: &SessionId) -> Progress {
  state.sessions.with_session(sid, |quiz| quiz.progress()).await
}

#[instrument(level = "info", skip(state, body), fields(session = %sid.0))]
pub async fn get_hint(state: &AppState, sid: &SessionId, body: HintIn) -> Result<HintOut, ApiError> {
  let question_id = parse_question_id(body.question_id.as_ref())?;
  let hint = state.sessions.with_session(sid, |quiz| quiz.hint(question_id)).await?;
  Ok(HintOut { hint, question_id })
}

pub async fn reset(state: &AppState, sid: &SessionId) -> ResetOut {
  let total_questions = state.sessions.reset(sid).await;
  ResetOut {
    success: true,
    message: "Quiz progress has been reset.".into(),
    total_questions,
  }
}

#[instrument(level = "info", skip(state, body), fields(session = %sid.0))]
pub async fn submit_answer(state: &AppState, sid: &SessionId, body: AnswerIn) -> Result<Graded, ApiError> {
  let generator = state.quiz_generator(GRADING_FEATURE)?;

  let user_answer = required_text(body.user_answer.as_deref(), "Answer cannot be empty")?;
  let question_id = parse_question_id(body.question_id.as_ref())?;

  let (question, recorded): (Question, Progress) = state
    .sessions
    .with_session(sid, |quiz| {
      let q = quiz
        .find(question_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Question not found in session".into()))?;
      quiz.record_attempt(question_id);
      Ok::<_, ApiError>((q, quiz.progress()))
    })
    .await?;

  let prompt = build_grading_prompt(&state.prompts, &question, &user_answer);
  let (verdict, upstream_failed): (Verdict, bool) = match generator.generate(&prompt).await {
    Ok(raw) => {
      debug!(target: "quiz", %question_id, reply = %trunc_for_log(&raw, 120), "Grading reply");
      (parse_verdict(&raw, &question.answer), false)
    }
    Err(e) => {
      error!(target: "quiz", %question_id, error = %e, "Grading call failed; returning degraded verdict");
      (degraded_verdict(&question.answer), true)
    }
  };

  let is_correct = verdict.is_correct;
  let progress = state
    .sessions
    .with_existing(sid, |quiz| {
      if is_correct {
        quiz.record_correct();
      }
      quiz.progress()
    })
    .await;
  let progress = progress.unwrap_or_else(|| {
    warn!(target: "quiz", session = %sid.0, "Session vanished during grading; verdict not recorded");
    recorded
  });

  info!(target: "quiz", %question_id, is_correct, upstream_failed, attempts = progress.total_attempts, "Answer graded");
  Ok(Graded {
    out: AnswerOut {
      is_correct,
      chatbot_feedback: verdict.feedback,
      correct_answer: question.answer,
      progress,
    },
    upstream_failed,
  })
}

#[instrument(level = "info", skip(state, body), fields(session = %sid.0))]
pub async fn ask_help(state: &AppState, sid: &SessionId, body: HelpIn) -> Result<HelpOut, ApiError> {
  let generator = state.quiz_generator(HELP_FEATURE)?;

  let help_question = required_text(body.help_question.as_deref(), "Help question cannot be empty")?;
  let question_id = parse_question_id(body.question_id.as_ref())?;

  let question = state
    .sessions
    .with_session(sid, |quiz| quiz.find(question_id).cloned())
    .await
    .ok_or_else(|| ApiError::NotFound("Associated quiz question not found".into()))?;

  let prompt = fill_template(
    &state.prompts.help_template,
    &[
      ("question", question.question.as_str()),
      ("answer", question.answer.as_str()),
      ("help_question", help_question.as_str()),
    ],
  );

  let chatbot_response = match generator.generate(&prompt).await {
    Ok(text) => text,
    Err(e) => {
      error!(target: "quiz", %question_id, error = %e, "Help call failed; using fallback text");
      HELP_FALLBACK.to_string()
    }
  };
  Ok(HelpOut { chatbot_response })
}

pub fn random_content(state: &AppState) -> Result<GameContentOut, ApiError> {
  state
    .random_game_item()
    .map(GameContentOut::from)
    .ok_or_else(|| ApiError::NotFound("No game content available".into()))
}

/// Judge a prompt guess. Stateless: session counters are never touched.
#[instrument(level = "info", skip(state, body))]
pub async fn submit_guess(state: &AppState, body: GuessIn) -> Result<GuessOut, ApiError> {
  let generator = state.game_generator()?;

  let content_id = body.content_id.as_deref().map(str::trim).unwrap_or_default();
  let user_guess = body.user_guess.as_deref().map(str::trim).unwrap_or_default();
  if content_id.is_empty() || user_guess.is_empty() {
    return Err(ApiError::InvalidInput("Missing content ID or guess".into()));
  }

  let item = state
    .find_game_item(content_id)
    .ok_or_else(|| ApiError::NotFound("Game content item not found".into()))?;

  let prompt = build_similarity_prompt(&state.prompts, item, user_guess);
  let evaluation = match generator.generate(&prompt).await {
    Ok(raw) => {
      debug!(target: "game", %content_id, reply = %trunc_for_log(&raw, 120), "Similarity reply");
      parse_similarity(&raw)
    }
    Err(e) => {
      error!(target: "game", %content_id, error = %e, "Similarity call failed");
      failed_evaluation()
    }
  };

  info!(target: "game", %content_id, similarity = evaluation.tier.as_str(), "Prompt guess evaluated");
  Ok(GuessOut {
    similarity: evaluation.tier,
    feedback: evaluation.explanation,
    original_prompt: item.original_prompt.clone(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SimilarityTier;
  use crate::config::Settings;
  use crate::testing::{state_with, state_with_settings, ScriptedGenerator};
  use std::time::Duration;
  use serde_json::json;

  fn sid() -> SessionId {
    SessionId("s1".into())
  }

  fn answer(id: serde_json::Value, text: &str) -> AnswerIn {
    AnswerIn { question_id: Some(id), user_answer: Some(text.into()) }
  }

  #[tokio::test]
  async fn correct_reply_bumps_correct_count() {
    let quiz = ScriptedGenerator::new(vec![Ok("Correct!".into())]);
    let state = state_with(Some(quiz.clone()), None);
    let g = submit_answer(&state, &sid(), answer(json!(3), " Answer 3 ")).await.unwrap();
    assert!(g.out.is_correct);
    assert!(!g.upstream_failed);
    assert_eq!(g.out.correct_answer, "Answer 3");
    assert_eq!((g.out.progress.correct_answers, g.out.progress.total_attempts), (1, 1));

    let prompts = quiz.prompts();
    assert!(prompts[0].contains("User's Answer: Answer 3\n"));
  }

  #[tokio::test]
  async fn unexpected_reply_is_incorrect_with_expected_answer() {
    let quiz = ScriptedGenerator::new(vec![Ok("Looks right to me".into())]);
    let state = state_with(Some(quiz), None);
    let g = submit_answer(&state, &sid(), answer(json!("2"), "whatever")).await.unwrap();
    assert!(!g.out.is_correct);
    assert!(g.out.chatbot_feedback.contains("'Answer 2'"));
    assert_eq!(g.out.progress.correct_answers, 0);
  }

  #[tokio::test]
  async fn double_submission_counts_two_attempts_one_answered() {
    let quiz = ScriptedGenerator::new(vec![
      Ok("Incorrect. The correct answer is: 'Answer 1'. No.".into()),
      Ok("Correct!".into()),
    ]);
    let state = state_with(Some(quiz), None);
    submit_answer(&state, &sid(), answer(json!(1), "nope")).await.unwrap();
    let g = submit_answer(&state, &sid(), answer(json!(1), "Answer 1")).await.unwrap();
    assert_eq!(g.out.progress.total_attempts, 2);
    assert_eq!(g.out.progress.completed_questions, 1);
    assert_eq!(g.out.progress.correct_answers, 1);
  }

  #[tokio::test]
  async fn backend_failure_degrades_without_correct_credit() {
    let quiz = ScriptedGenerator::failing();
    let state = state_with(Some(quiz), None);
    let g = submit_answer(&state, &sid(), answer(json!(4), "Answer 4")).await.unwrap();
    assert!(g.upstream_failed);
    assert!(!g.out.is_correct);
    assert_eq!(g.out.chatbot_feedback, "Incorrect. The correct answer is: 'Answer 4'. AI evaluation unavailable.");
    assert_eq!((g.out.progress.correct_answers, g.out.progress.total_attempts), (0, 1));
  }

  #[tokio::test]
  async fn session_evicted_mid_grading_is_not_recreated() {
    let quiz = ScriptedGenerator::delayed(vec![Ok("Correct!".into())], Duration::from_millis(60));
    let settings = Settings { session_idle: Duration::from_millis(10), ..Settings::default() };
    let state = state_with_settings(Some(quiz), None, &settings);
    let other = SessionId("s2".into());
    let s1 = sid();

    let (graded, _) = tokio::join!(submit_answer(&state, &s1, answer(json!(1), "Answer 1")), async {
      // Creating another session after the idle window evicts "s1".
      tokio::time::sleep(Duration::from_millis(30)).await;
      state.sessions.with_session(&other, |quiz| quiz.progress()).await
    });

    let g = graded.unwrap();
    assert!(g.out.is_correct);
    assert_eq!(g.out.progress.total_attempts, 1);
    assert_eq!(g.out.progress.completed_questions, 1);
    assert_eq!(g.out.progress.correct_answers, 0);
    assert_eq!(state.sessions.len().await, 1);
  }

  #[tokio::test]
  async fn submission_validation_order() {
    let state = state_with(None, None);
    assert!(matches!(
      submit_answer(&state, &sid(), answer(json!(1), "x")).await,
      Err(ApiError::UpstreamUnavailable(_))
    ));

    let state = state_with(Some(ScriptedGenerator::new(vec![])), None);
    assert!(matches!(
      submit_answer(&state, &sid(), answer(json!(1), "   ")).await,
      Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
      submit_answer(&state, &sid(), answer(json!("one"), "x")).await,
      Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
      submit_answer(&state, &sid(), answer(json!(99), "x")).await,
      Err(ApiError::NotFound(_))
    ));
    // rejected submissions do not count
    assert_eq!(get_progress(&state, &sid()).await.total_attempts, 0);
  }

  #[tokio::test]
  async fn question_walk_wraps_after_bank_length() {
    let state = state_with(None, None);
    let s = sid();
    assert_eq!(reset(&state, &s).await.total_questions, 5);
    assert_eq!(get_question(&state, &s, false).await.unwrap().question_number, 1);
    let mut numbers = vec![];
    for _ in 0..5 {
      numbers.push(get_question(&state, &s, true).await.unwrap().question_number);
    }
    assert_eq!(numbers, vec![2, 3, 4, 5, 1]);
    // plain refetch does not move
    assert_eq!(get_question(&state, &s, false).await.unwrap().question_number, 1);
  }

  #[tokio::test]
  async fn hint_and_help() {
    let quiz = ScriptedGenerator::new(vec![Ok("Think about spikes.".into())]);
    let state = state_with(Some(quiz.clone()), None);
    let h = get_hint(&state, &sid(), HintIn { question_id: Some(json!(1)) }).await.unwrap();
    assert_eq!((h.hint.as_str(), h.question_id), ("Hint 1", 1));
    assert!(matches!(
      get_hint(&state, &sid(), HintIn { question_id: Some(json!(77)) }).await,
      Err(ApiError::NotFound(_))
    ));

    let out = ask_help(
      &state,
      &sid(),
      HelpIn { help_question: Some("what is this about?".into()), question_id: Some(json!(2)) },
    )
    .await
    .unwrap();
    assert_eq!(out.chatbot_response, "Think about spikes.");
    let prompt = &quiz.prompts()[0];
    assert!(prompt.contains("do not reveal directly): Answer 2"));
    assert!(prompt.contains("User's Help Request: what is this about?"));
  }

  #[tokio::test]
  async fn help_failure_uses_fallback_text() {
    let state = state_with(Some(ScriptedGenerator::failing()), None);
    let out = ask_help(
      &state,
      &sid(),
      HelpIn { help_question: Some("?".into()), question_id: Some(json!(2)) },
    )
    .await
    .unwrap();
    assert_eq!(out.chatbot_response, HELP_FALLBACK);
  }

  #[tokio::test]
  async fn guess_is_parsed_and_stateless() {
    let game = ScriptedGenerator::new(vec![
      Ok("Similarity: Somewhat Similar. Explanation: Close topic.".into()),
      Ok("Similarity: Meh. Explanation: ?".into()),
    ]);
    let state = state_with(None, Some(game));
    let body = || GuessIn { content_id: Some("g1".into()), user_guess: Some("robot poem".into()) };

    let out = submit_guess(&state, body()).await.unwrap();
    assert_eq!(out.similarity, SimilarityTier::SomewhatSimilar);
    assert_eq!(out.feedback, "Close topic.");
    assert_eq!(out.original_prompt, "Prompt g1");

    let out = submit_guess(&state, body()).await.unwrap();
    assert_eq!(out.similarity, SimilarityTier::Unknown);
    assert_eq!(out.feedback, "Similarity: Meh. Explanation: ?");

    assert_eq!(state.sessions.len().await, 0);
  }

  #[tokio::test]
  async fn guess_validation() {
    let state = state_with(None, None);
    let body = GuessIn { content_id: Some("g1".into()), user_guess: Some("x".into()) };
    assert!(matches!(submit_guess(&state, body).await, Err(ApiError::UpstreamUnavailable(_))));

    let state = state_with(None, Some(ScriptedGenerator::failing()));
    let missing = GuessIn { content_id: Some("g1".into()), user_guess: Some("  ".into()) };
    assert!(matches!(submit_guess(&state, missing).await, Err(ApiError::InvalidInput(_))));
    let unknown = GuessIn { content_id: Some("zz".into()), user_guess: Some("x".into()) };
    assert!(matches!(submit_guess(&state, unknown).await, Err(ApiError::NotFound(_))));

    let failed = GuessIn { content_id: Some("g1".into()), user_guess: Some("x".into()) };
    let out = submit_guess(&state, failed).await.unwrap();
    assert_eq!(out.similarity, SimilarityTier::Unknown);
    assert_eq!(out.feedback, "Could not get evaluation from AI.");
  }

  #[test]
  fn random_content_hides_source_prompt() {
    let state = state_with(None, None);
    let v = serde_json::to_value(random_content(&state).unwrap()).unwrap();
    assert!(v.get("original_prompt").is_none());
    assert_eq!(v["type"], "text");
  }
}

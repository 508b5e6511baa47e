//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; logs carry ids and sizes, never answer text.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Extension, Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic;
use crate::protocol::*;
use crate::session::SessionId;
use crate::state::AppState;

/// Body extraction with the rejection folded into our 400. AI endpoints check
/// their generator first, so an unconfigured backend answers 503 whatever the body.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  payload
    .map(|Json(b)| b)
    .map_err(|e| ApiError::InvalidInput(format!("No data received: {}", e.body_text())))
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    ai_enabled: state.ai_enabled(),
    questions: state.bank.len(),
    active_sessions: state.sessions.len().await,
  })
}

#[instrument(level = "info", skip(state, sid), fields(next = q.wants_next()))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  Query(q): Query<QuestionQuery>,
) -> Result<Json<QuestionView>, ApiError> {
  let view = logic::get_question(&state, &sid, q.wants_next()).await?;
  info!(target: "quiz", id = view.id, number = view.question_number, "HTTP question served");
  Ok(Json(view))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_submit_answer(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  payload: Result<Json<AnswerIn>, JsonRejection>,
) -> Result<Response, ApiError> {
  state.quiz_generator(logic::GRADING_FEATURE)?;
  let graded = logic::submit_answer(&state, &sid, body(payload)?).await?;
  let status = if graded.upstream_failed { StatusCode::INTERNAL_SERVER_ERROR } else { StatusCode::OK };
  Ok((status, Json(graded.out)).into_response())
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  payload: Result<Json<HintIn>, JsonRejection>,
) -> Result<Json<HintOut>, ApiError> {
  let out = logic::get_hint(&state, &sid, body(payload)?).await?;
  info!(target: "quiz", id = out.question_id, "HTTP hint served");
  Ok(Json(out))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_ask_chatbot(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  payload: Result<Json<HelpIn>, JsonRejection>,
) -> Result<Json<HelpOut>, ApiError> {
  state.quiz_generator(logic::HELP_FEATURE)?;
  Ok(Json(logic::ask_help(&state, &sid, body(payload)?).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
) -> Json<ResetOut> {
  Json(logic::reset(&state, &sid).await)
}

#[instrument(level = "info", skip_all)]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
) -> Json<Progress> {
  Json(logic::get_progress(&state, &sid).await)
}

#[instrument(level = "info", skip_all)]
pub async fn http_get_generated_content(
  State(state): State<Arc<AppState>>,
) -> Result<Json<GameContentOut>, ApiError> {
  let out = logic::random_content(&state)?;
  info!(target: "game", id = %out.id, "HTTP game content served");
  Ok(Json(out))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_submit_prompt_guess(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<GuessIn>, JsonRejection>,
) -> Result<Json<GuessOut>, ApiError> {
  state.game_generator()?;
  Ok(Json(logic::submit_guess(&state, body(payload)?).await?))
}

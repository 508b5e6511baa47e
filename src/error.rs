//! Error taxonomy for the HTTP API and the text-completion backend.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to API clients. Each variant maps to one status code.
/// A failed grading call is not an error here: it still answers with a degraded
/// verdict body, sent with status 500 by the handler.
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  InvalidInput(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  UpstreamUnavailable(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

/// Failures of a single text-completion call.
#[derive(Error, Debug)]
pub enum GenerateError {
  #[error("backend request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("backend HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("backend returned no text")]
  Empty,
}

/// Problems with the optional TOML content file. All of them fall back to the built-ins.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("could not read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid TOML: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("duplicate question id {0}")]
  DuplicateQuestionId(u32),

  #[error("duplicate game content id {0:?}")]
  DuplicateContentId(String),
}

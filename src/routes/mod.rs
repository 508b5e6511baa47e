//! Router assembly: HTTP endpoints, session middleware, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/...`, every route behind the session middleware
/// - Static files from `static_dir` for everything else
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
    let static_service = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/question", get(http::http_get_question))
        .route("/api/submit_answer", post(http::http_post_submit_answer))
        .route("/api/hint", post(http::http_post_hint))
        .route("/api/ask_chatbot", post(http::http_post_ask_chatbot))
        .route("/api/reset", post(http::http_post_reset))
        .route("/api/progress", get(http::http_get_progress))
        .route("/api/generated_content", get(http::http_get_generated_content))
        .route("/api/submit_prompt_guess", post(http::http_post_submit_prompt_guess))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_layer))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

/// Attach the caller's `SessionId` to the request, issuing a signed cookie when
/// the request carried none (or a bad one).
async fn session_layer(State(state): State<Arc<AppState>>, mut req: Request, next: Next) -> Response {
    let (sid, set_cookie) = state.sessions.resolve(req.headers());
    req.extensions_mut().insert(sid);
    let mut resp = next.run(req).await;
    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                resp.headers_mut().append(SET_COOKIE, v);
            }
            Err(e) => warn!(target: "quizbench", error = %e, "Could not encode session cookie"),
        }
    }
    resp
}

//! Application state: static content, the per-session store, prompts and the
//! optional text-completion backends.
//!
//! This module owns:
//!   - the question bank and game content (from TOML or built-in seeds)
//!   - the session store keyed by session id
//!   - the prompts struct (from TOML or defaults)
//!   - optional generators for the quiz and the game
//!
//! Without OPENAI_API_KEY the AI endpoints answer 503; everything else works.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{info, instrument, warn};

use crate::config::{load_quiz_config_from_env, Prompts, QuizConfig, Settings};
use crate::domain::{GameContentItem, Question};
use crate::error::ApiError;
use crate::openai::{Generators, TextGenerator};
use crate::seeds::{seed_game_content, seed_questions};
use crate::session::SessionStore;

pub struct AppState {
    pub bank: Arc<Vec<Question>>,
    pub game_content: Vec<GameContentItem>,
    pub sessions: SessionStore,
    pub prompts: Prompts,
    pub quiz_ai: Option<Arc<dyn TextGenerator>>,
    pub game_ai: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// Build state from env: load config, pick content, init backends.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: &Settings) -> Self {
        let cfg = load_quiz_config_from_env().unwrap_or_default();

        let (quiz_ai, game_ai) = match Generators::from_env() {
            Some(g) => {
                info!(target: "quizbench", quiz_model = %g.quiz.model(), game_model = %g.game.model(), "OpenAI enabled.");
                (
                    Some(Arc::new(g.quiz) as Arc<dyn TextGenerator>),
                    Some(Arc::new(g.game) as Arc<dyn TextGenerator>),
                )
            }
            None => {
                warn!(target: "quizbench", "OpenAI disabled (no OPENAI_API_KEY). AI endpoints will answer 503.");
                (None, None)
            }
        };

        Self::from_config(cfg, quiz_ai, game_ai, settings)
    }

    /// Content from the TOML config, with the built-in seeds for any empty table.
    pub fn from_config(
        cfg: QuizConfig,
        quiz_ai: Option<Arc<dyn TextGenerator>>,
        game_ai: Option<Arc<dyn TextGenerator>>,
        settings: &Settings,
    ) -> Self {
        let bank = if cfg.questions.is_empty() {
            seed_questions()
        } else {
            cfg.questions
        };
        let game_content = if cfg.game_content.is_empty() {
            seed_game_content()
        } else {
            cfg.game_content
        };
        info!(target: "quizbench", questions = bank.len(), game_items = game_content.len(), "Startup content inventory");

        Self::with_parts(bank, game_content, cfg.prompts, quiz_ai, game_ai, settings)
    }

    /// Assemble state from explicit parts. Used by `new` and by tests with stub generators.
    pub fn with_parts(
        bank: Vec<Question>,
        game_content: Vec<GameContentItem>,
        prompts: Prompts,
        quiz_ai: Option<Arc<dyn TextGenerator>>,
        game_ai: Option<Arc<dyn TextGenerator>>,
        settings: &Settings,
    ) -> Self {
        let bank = Arc::new(bank);
        let sessions = SessionStore::new(bank.clone(), settings.session_secret.clone(), settings.session_idle);
        Self {
            bank,
            game_content,
            sessions,
            prompts,
            quiz_ai,
            game_ai,
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.quiz_ai.is_some() && self.game_ai.is_some()
    }

    /// Generator for grading/help, or 503 when unconfigured.
    pub fn quiz_generator(&self, feature: &str) -> Result<Arc<dyn TextGenerator>, ApiError> {
        self.quiz_ai.clone().ok_or_else(|| unavailable(feature))
    }

    /// Generator for the prompt game, or 503 when unconfigured.
    pub fn game_generator(&self) -> Result<Arc<dyn TextGenerator>, ApiError> {
        self.game_ai.clone().ok_or_else(|| unavailable("evaluating prompt guesses"))
    }

    pub fn find_game_item(&self, content_id: &str) -> Option<&GameContentItem> {
        self.game_content.iter().find(|item| item.id == content_id)
    }

    /// Uniform pick among game items.
    pub fn random_game_item(&self) -> Option<&GameContentItem> {
        self.game_content.choose(&mut rand::thread_rng())
    }
}

fn unavailable(feature: &str) -> ApiError {
    ApiError::UpstreamUnavailable(format!(
        "AI Model Configuration Error: the AI model required for {feature} is not available (OPENAI_API_KEY not set)."
    ))
}

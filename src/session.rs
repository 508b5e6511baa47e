//! Server-side session store: one `QuizState` per session id, plus the signed
//! cookie that carries the id.
//!
//! Cookie value: `<uuid>.<hex hmac-sha256(secret, uuid)>`. Anything that fails to
//! verify is treated as "no session" and a new one is issued.
//! Sessions idle longer than the configured window are evicted whenever a new
//! session is created.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::http::{header::COOKIE, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::Question;
use crate::quiz::QuizState;

pub const SESSION_COOKIE: &str = "quiz_session";

/// Opaque per-user key, attached to each request by the session middleware.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

struct SessionEntry {
    quiz: QuizState,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    bank: Arc<Vec<Question>>,
    secret: String,
    idle: Duration,
}

impl SessionStore {
    pub fn new(bank: Arc<Vec<Question>>, secret: String, idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            bank,
            secret,
            idle,
        }
    }

    /// Session id from the request cookie if its signature checks out; otherwise a
    /// new id together with the `Set-Cookie` value to send back.
    pub fn resolve(&self, headers: &HeaderMap) -> (SessionId, Option<String>) {
        if let Some(sid) = cookie_value(headers, SESSION_COOKIE).and_then(|v| self.verify(&v)) {
            return (sid, None);
        }
        let id = Uuid::new_v4().to_string();
        let value = format!("{}.{}", id, self.sign(&id));
        let cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax");
        debug!(target: "quiz", session = %id, "Issued new session cookie");
        (SessionId(id), Some(cookie))
    }

    fn mac(&self, id: &str) -> Option<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(id.as_bytes());
        Some(mac)
    }

    fn sign(&self, id: &str) -> String {
        self.mac(id)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    /// Constant-time signature check.
    fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, sig) = value.split_once('.')?;
        Uuid::parse_str(id).ok()?;
        let sig = hex::decode(sig).ok()?;
        self.mac(id)?.verify_slice(&sig).ok()?;
        Some(SessionId(id.to_string()))
    }

    /// Run `f` on the session's quiz state, creating it (fresh shuffle) if missing.
    pub async fn with_session<T>(&self, sid: &SessionId, f: impl FnOnce(&mut QuizState) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let entry = self.entry_or_insert(&mut sessions, sid);
        entry.last_seen = Instant::now();
        f(&mut entry.quiz)
    }

    /// Like `with_session`, but never creates: `None` if the session is gone.
    pub async fn with_existing<T>(&self, sid: &SessionId, f: impl FnOnce(&mut QuizState) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(sid)?;
        entry.last_seen = Instant::now();
        Some(f(&mut entry.quiz))
    }

    /// Replace the session's state wholesale with a fresh shuffle and zero counters.
    #[instrument(level = "info", skip(self), fields(session = %sid.0))]
    pub async fn reset(&self, sid: &SessionId) -> usize {
        let quiz = QuizState::fresh(&self.bank, &mut rand::thread_rng());
        let total = quiz.len();
        let mut sessions = self.sessions.write().await;
        sessions.insert(sid.clone(), SessionEntry { quiz, last_seen: Instant::now() });
        info!(target: "quiz", session = %sid.0, total, "Quiz progress reset");
        total
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn entry_or_insert<'a>(
        &self,
        sessions: &'a mut HashMap<SessionId, SessionEntry>,
        sid: &SessionId,
    ) -> &'a mut SessionEntry {
        if !sessions.contains_key(sid) {
            let before = sessions.len();
            let idle = self.idle;
            sessions.retain(|_, e| e.last_seen.elapsed() < idle);
            let evicted = before - sessions.len();
            if evicted > 0 {
                info!(target: "quiz", evicted, "Evicted idle sessions");
            }
        }
        sessions.entry(sid.clone()).or_insert_with(|| {
            let quiz = QuizState::fresh(&self.bank, &mut rand::thread_rng());
            debug!(target: "quiz", session = %sid.0, total = quiz.len(), "Created quiz session");
            SessionEntry { quiz, last_seen: Instant::now() }
        })
    }
}

/// First value of the named cookie across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

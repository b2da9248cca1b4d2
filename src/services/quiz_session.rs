use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::models::domain::Quiz;

/// A live quiz together with the instant its session lapses.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveQuiz {
    pub quiz: Quiz,
    pub expires_at: DateTime<Utc>,
}

impl ActiveQuiz {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one live quiz per actor.
///
/// Every operation takes the write lock for its whole read-modify-write, so a
/// generation and a submission for the same actor never interleave: a quiz is
/// handed to exactly one `take_and_clear` caller.
#[derive(Clone)]
pub struct QuizSessionStore {
    sessions: Arc<RwLock<HashMap<String, ActiveQuiz>>>,
    ttl: Duration,
}

impl QuizSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Stores `quiz` as the actor's active quiz, replacing any previous one.
    /// Returns the replaced quiz, if there was a live one.
    pub async fn put(&self, actor: &str, quiz: Quiz) -> Option<Quiz> {
        let now = Utc::now();
        let entry = ActiveQuiz {
            quiz,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions
            .insert(actor.to_string(), entry)
            .filter(|previous| !previous.is_expired(now))
            .map(|previous| previous.quiz)
    }

    /// Removes and returns the actor's live quiz with its expiry. An expired
    /// quiz is dropped and reported as absent.
    pub async fn take_and_clear(&self, actor: &str) -> Option<ActiveQuiz> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.remove(actor)?;

        if entry.is_expired(now) {
            log::info!("Quiz {} for '{}' expired before submission", entry.quiz.id, actor);
            return None;
        }
        Some(entry)
    }

    /// Puts a taken quiz back with its original expiry, unless it has lapsed
    /// meanwhile or the actor already has a newer one. Returns whether the quiz
    /// was restored.
    pub async fn restore(&self, actor: &str, entry: ActiveQuiz) -> bool {
        let now = Utc::now();
        if entry.is_expired(now) {
            return false;
        }

        let mut sessions = self.sessions.write().await;
        match sessions.get(actor) {
            Some(existing) if !existing.is_expired(now) => false,
            _ => {
                sessions.insert(actor.to_string(), entry);
                true
            }
        }
    }

    /// Ends the actor's session without recording a result.
    pub async fn discard(&self, actor: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(actor)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drops every quiz whose session has expired by `now`. Returns how many
    /// were dropped.
    pub async fn drop_on_expiry(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }

    pub async fn has_active(&self, actor: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(actor)
            .is_some_and(|entry| !entry.is_expired(Utc::now()))
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

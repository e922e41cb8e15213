// In-memory page sessions for the web UI, one per visitor.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::answers::{AnswerRecord, FieldUpdate};
use crate::chat::ChatSession;
use crate::error::{QuizError, Result};
use crate::page::Page;
use crate::quiz_form::QuizForm;

/// One visitor's page: the container state, the answers in progress and, after submit, the chat.
#[derive(Debug, Default)]
pub struct GardenSession {
    pub page: Page,
    pub answers: AnswerRecord,
    pub chat: Option<ChatSession>,
}

impl GardenSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a field change while the quiz is still showing.
    pub fn update(&mut self, update: FieldUpdate) -> Result<&AnswerRecord> {
        if self.page.is_chatting() {
            return Err(QuizError::AlreadySubmitted);
        }
        self.answers.apply(update);
        Ok(&self.answers)
    }

    /// Submits `answers` through the quiz form and hands the prompt to the page.
    /// Returns false if the page had already switched to the chat.
    pub fn submit(&mut self, answers: AnswerRecord) -> bool {
        if self.page.is_chatting() {
            warn!("Quiz submitted again after switching to chat; ignoring");
            return false;
        }

        self.answers = answers.clone();
        let page = &mut self.page;
        QuizForm::with_answers(answers, |prompt| {
            page.receive_result(prompt);
        })
        .submit();

        self.chat = self.page.quiz_results().map(ChatSession::new);
        true
    }

    pub fn chat_mut(&mut self) -> Result<&mut ChatSession> {
        self.chat.as_mut().ok_or(QuizError::NotSubmitted)
    }
}

struct Tracked {
    session: GardenSession,
    last_seen: Instant,
}

/// Shared map of page sessions. Every access refreshes a session's idle clock.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Tracked>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().await.insert(
            id,
            Tracked {
                session: GardenSession::new(),
                last_seen: Instant::now(),
            },
        );
        info!(session = %id, "Created garden session");
        id
    }

    /// Runs `f` against the session with the store lock held.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut GardenSession) -> R,
    ) -> Result<R> {
        let mut sessions = self.sessions.lock().await;
        let tracked = sessions.get_mut(&id).ok_or(QuizError::SessionNotFound(id))?;
        tracked.last_seen = Instant::now();
        Ok(f(&mut tracked.session))
    }

    /// Like `with_session`, for callers that only look.
    pub async fn read_session<R>(&self, id: Uuid, f: impl FnOnce(&GardenSession) -> R) -> Result<R> {
        self.with_session(id, |session| f(session)).await
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops sessions untouched for longer than `max_idle`. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, tracked| now.duration_since(tracked.last_seen) <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted idle garden sessions");
        }
        evicted
    }

    /// Sweeps idle sessions every `period` until the returned task is aborted.
    pub fn spawn_sweeper(&self, max_idle: Duration, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.evict_idle(max_idle).await;
            }
        })
    }
}

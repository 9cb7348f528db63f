//! Quiz sessions.
//!
//! A [`QuizSession`] walks one user through the four layers in order. Answers
//! are only accepted for the layer currently shown; advancing fills untouched
//! sliders with the default position, reports the layer's result and moves on.
//! Finishing the last layer produces the [`QuizRecord`] the client stores or
//! shares.
//!
//! Every session owns its own tallies. The [`SessionStore`] only maps ids to
//! sessions.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use noy_boundary::{
    AnswerSheet, Boundary, BoundaryAggregator, Layer, LayerResult, LayerResults, QuizRecord,
    SliderPosition,
};
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::VoteMode;
use crate::error::SessionError;

/// Opaque session identifier: 16 random bytes, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of completing a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advance {
    /// The layer just completed
    pub layer: Layer,
    /// Its result
    pub result: Option<LayerResult>,
    /// The layer now being answered, `None` once the quiz is finished
    pub next_layer: Option<Layer>,
    /// Set when this advance finished the quiz
    pub record: Option<QuizRecord>,
}

/// Snapshot of a session for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub current_layer: Option<Layer>,
    pub completed_layers: Vec<Layer>,
    /// Answers given in the current layer
    pub answered: usize,
    pub vote_mode: VoteMode,
    pub finished: bool,
    /// Results of completed layers
    pub layer_results: LayerResults,
}

/// One user's pass through the quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: VoteMode,
    current: Option<Layer>,
    completed: Vec<Layer>,
    answers: AnswerSheet,
    /// Running tally; only used in additive mode
    votes: BoundaryAggregator,
    /// Results captured when each layer was completed
    results: LayerResults,
    record: Option<QuizRecord>,
}

impl QuizSession {
    /// A session positioned at the first layer.
    pub fn new(mode: VoteMode) -> Self {
        Self {
            mode,
            current: Some(Layer::Outer),
            completed: Vec::new(),
            answers: AnswerSheet::new(),
            votes: BoundaryAggregator::new(),
            results: LayerResults::default(),
            record: None,
        }
    }

    /// Layer currently being answered, `None` once finished.
    pub fn current_layer(&self) -> Option<Layer> {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Record an answer in the current layer.
    ///
    /// Returns the selected boundary, or `Ok(None)` for an unknown question or
    /// a non-canonical slider value (nothing is recorded then).
    pub fn answer(
        &mut self,
        question_id: u32,
        value: u32,
    ) -> Result<Option<Boundary>, SessionError> {
        let current = self.current.ok_or(SessionError::Finished)?;
        if let Some(layer) = Layer::for_question(question_id) {
            if layer != current {
                return Err(SessionError::WrongLayer {
                    question_id,
                    current,
                });
            }
        }

        let boundary = self.answers.answer(question_id, value);
        if boundary.is_some() && self.mode == VoteMode::Additive {
            self.votes.add_vote(question_id, value);
        }
        Ok(boundary)
    }

    /// Complete the current layer and move to the next one.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let layer = self.current.ok_or(SessionError::Finished)?;

        let filled = self.answers.fill_defaults(layer, SliderPosition::DEFAULT);
        if filled > 0 {
            tracing::debug!(%layer, filled, "unanswered questions set to default");
        }
        if self.mode == VoteMode::Additive {
            for (id, position) in self.answers.layer_answers(layer) {
                self.votes.add_vote(id, position.value());
            }
        }

        let result = self.tallies().calculate_layer_result(layer);
        self.results.set(layer, result.clone());
        if !self.completed.contains(&layer) {
            self.completed.push(layer);
        }

        self.current = Layer::ALL
            .into_iter()
            .find(|l| !self.completed.contains(l));

        let record = match self.current {
            Some(_) => None,
            None => {
                let record = QuizRecord {
                    layer_results: self.tallies().all_results(),
                    completed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    user_id: generate_user_id(),
                };
                self.record = Some(record.clone());
                Some(record)
            }
        };

        Ok(Advance {
            layer,
            result,
            next_layer: self.current,
            record,
        })
    }

    /// Clear a layer's answers and votes and make it the current layer again.
    pub fn retake(&mut self, layer: Layer) {
        self.answers.clear_layer(layer);
        self.votes.reset_layer_votes(layer);
        self.results.set(layer, None);
        self.completed.retain(|l| *l != layer);
        self.current = Some(layer);
        self.record = None;
    }

    /// Live results for all layers, computed from the current tallies.
    pub fn results(&self) -> LayerResults {
        self.tallies().all_results()
    }

    /// The finished quiz, if every layer is complete.
    pub fn record(&self) -> Option<&QuizRecord> {
        self.record.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            current_layer: self.current,
            completed_layers: self.completed.clone(),
            answered: self.current.map(|l| self.answers.answered_in(l)).unwrap_or(0),
            vote_mode: self.mode,
            finished: self.is_finished(),
            layer_results: self.results.clone(),
        }
    }

    fn tallies(&self) -> Cow<'_, BoundaryAggregator> {
        match self.mode {
            VoteMode::Additive => Cow::Borrowed(&self.votes),
            VoteMode::Latest => Cow::Owned(self.answers.aggregator()),
        }
    }
}

fn generate_user_id() -> String {
    format!("N.{}", rand::thread_rng().gen_range(1..=999))
}

/// How long a session may sit untouched before it can be dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct StoredSession {
    session: QuizSession,
    last_access: Instant,
}

impl StoredSession {
    fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_access) >= timeout
    }
}

/// In-memory map of live sessions.
///
/// Sessions untouched for longer than the idle timeout are dropped by
/// [`SessionStore::sweep_idle`]. When the store is full, `create` first drops
/// idle sessions and then the least recently used finished one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, StoredSession>>,
    capacity: usize,
    mode: VoteMode,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(capacity: usize, mode: VoteMode) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
            mode,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Start a new session.
    pub async fn create(&self) -> Result<(SessionId, SessionStatus), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.capacity {
            self.make_room(&mut sessions);
        }
        if sessions.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "session store full");
            return Err(SessionError::StoreFull {
                capacity: self.capacity,
            });
        }

        let id = SessionId::generate();
        let session = QuizSession::new(self.mode);
        let status = session.status();
        sessions.insert(
            id.clone(),
            StoredSession {
                session,
                last_access: Instant::now(),
            },
        );
        tracing::info!(session = %id, mode = %self.mode, "session started");
        Ok((id, status))
    }

    /// Run `f` against a session.
    pub async fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut QuizSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        stored.touch();
        f(&mut stored.session)
    }

    /// Read-only view of a session. Still counts as an access.
    pub async fn read<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&QuizSession) -> T,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        stored.touch();
        Ok(f(&stored.session))
    }

    /// Drop a session.
    pub async fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(_) => {
                tracing::info!(session = %id, "session removed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }

    /// Drop every session idle for longer than the idle timeout. Returns how
    /// many were dropped.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.drop_idle(&mut sessions, Instant::now())
    }

    /// Sweep idle sessions every `period` until the task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.sweep_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn drop_idle(&self, sessions: &mut HashMap<SessionId, StoredSession>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_idle(now, self.idle_timeout));
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::info!(dropped, "idle sessions expired");
        }
        dropped
    }

    fn make_room(&self, sessions: &mut HashMap<SessionId, StoredSession>) {
        if self.drop_idle(sessions, Instant::now()) > 0 {
            return;
        }
        let oldest_finished = sessions
            .iter()
            .filter(|(_, stored)| stored.session.is_finished())
            .min_by_key(|(_, stored)| stored.last_access)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest_finished {
            sessions.remove(&id);
            tracing::info!(session = %id, "finished session evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_layer(session: &mut QuizSession, value: u32) {
        let layer = session.current_layer().unwrap();
        for id in layer.question_ids() {
            session.answer(id, value).unwrap();
        }
    }

    #[test]
    fn walks_layers_in_order() {
        let mut session = QuizSession::new(VoteMode::Latest);
        let mut seen = Vec::new();
        while let Some(layer) = session.current_layer() {
            seen.push(layer);
            answer_layer(&mut session, 50);
            session.advance().unwrap();
        }
        assert_eq!(seen, Layer::ALL.to_vec());
        assert!(session.is_finished());
        assert!(matches!(session.advance(), Err(SessionError::Finished)));
        assert!(matches!(session.answer(1, 50), Err(SessionError::Finished)));
    }

    #[test]
    fn rejects_questions_from_other_layers() {
        let mut session = QuizSession::new(VoteMode::Latest);
        assert!(matches!(
            session.answer(5, 50),
            Err(SessionError::WrongLayer { question_id: 5, current: Layer::Outer })
        ));
        // Unknown questions are ignored, not rejected.
        assert_eq!(session.answer(99, 50).unwrap(), None);
        assert_eq!(session.answer(1, 10).unwrap(), None);
        assert_eq!(session.status().answered, 0);
    }

    #[test]
    fn advance_fills_defaults() {
        let mut session = QuizSession::new(VoteMode::Latest);
        session.answer(1, 0).unwrap(); // withdrawal

        let advance = session.advance().unwrap();
        assert_eq!(advance.layer, Layer::Outer);
        assert_eq!(advance.next_layer, Some(Layer::Daily));
        assert!(advance.record.is_none());

        // Defaults: q2 connection, q3 clarity, q4 flow at 50.
        let result = advance.result.unwrap();
        assert_eq!(result.votes.total(), 4);
        assert_eq!(result.votes.get(Boundary::Withdrawal), 1);
        assert_eq!(result.winning_boundary, Boundary::Withdrawal);
    }

    #[test]
    fn latest_mode_counts_each_question_once() {
        let mut session = QuizSession::new(VoteMode::Latest);
        for value in [0, 25, 50, 75, 100, 50] {
            session.answer(1, value).unwrap();
        }
        let result = session.advance().unwrap().result.unwrap();
        assert_eq!(result.votes.total(), 4);
        assert_eq!(result.votes.get(Boundary::Connection), 2); // q1 and q2 at 50
    }

    #[test]
    fn additive_mode_counts_every_submission() {
        let mut session = QuizSession::new(VoteMode::Additive);
        session.answer(1, 0).unwrap();
        session.answer(1, 50).unwrap();

        let result = session.advance().unwrap().result.unwrap();
        // Two live submissions plus the four answers cast again on advance.
        assert_eq!(result.votes.total(), 6);
        assert_eq!(result.votes.get(Boundary::Connection), 3);
        assert_eq!(result.votes.get(Boundary::Withdrawal), 1);
        assert_eq!(result.winning_boundary, Boundary::Connection);
    }

    #[test]
    fn finishing_produces_record() {
        let mut session = QuizSession::new(VoteMode::Latest);
        let mut last = None;
        while session.current_layer().is_some() {
            last = Some(session.advance().unwrap());
        }
        let record = last.unwrap().record.unwrap();
        assert!(record.user_id.starts_with("N."));
        let n: u32 = record.user_id[2..].parse().unwrap();
        assert!((1..=999).contains(&n));
        assert!(chrono::DateTime::parse_from_rfc3339(&record.completed_at).is_ok());
        assert!(record.layer_results.is_complete());
        assert_eq!(session.record(), Some(&record));
    }

    #[test]
    fn retake_resets_layer() {
        let mut session = QuizSession::new(VoteMode::Latest);
        while session.current_layer().is_some() {
            session.advance().unwrap();
        }
        assert!(session.record().is_some());

        session.retake(Layer::Daily);
        assert_eq!(session.current_layer(), Some(Layer::Daily));
        assert!(session.record().is_none());
        assert!(session.status().layer_results.daily.is_none());
        assert!(session.results().daily.is_none());
        assert!(session.results().outer.is_some());

        for id in Layer::Daily.question_ids() {
            session.answer(id, 100).unwrap();
        }
        let advance = session.advance().unwrap();
        assert_eq!(advance.next_layer, None);
        let record = advance.record.unwrap();
        // q5..q8 at 100: logic, stability, intuition, turbulence; logic first.
        assert_eq!(
            record.layer_results.daily.unwrap().winning_boundary,
            Boundary::Logic
        );
    }

    #[tokio::test]
    async fn store_lifecycle() {
        let store = SessionStore::new(2, VoteMode::Latest);
        let (a, status) = store.create().await.unwrap();
        assert_eq!(status.current_layer, Some(Layer::Outer));
        let (b, _) = store.create().await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);

        assert!(matches!(
            store.create().await,
            Err(SessionError::StoreFull { capacity: 2 })
        ));

        let boundary = store
            .with_session(&a, |s| s.answer(1, 50))
            .await
            .unwrap();
        assert_eq!(boundary, Some(Boundary::Connection));
        let answered = store.read(&a, |s| s.status().answered).await.unwrap();
        assert_eq!(answered, 1);

        store.remove(&a).await.unwrap();
        assert!(matches!(
            store.remove(&a).await,
            Err(SessionError::NotFound(_))
        ));
        assert_eq!(store.len().await, 1);
    }

    async fn finish(store: &SessionStore, id: &SessionId) {
        store
            .with_session(id, |s| {
                while !s.is_finished() {
                    s.advance()?;
                }
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn full_store_evicts_oldest_finished_session() {
        let store = SessionStore::new(2, VoteMode::Latest);
        let (a, _) = store.create().await.unwrap();
        let (b, _) = store.create().await.unwrap();
        finish(&store, &a).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        finish(&store, &b).await;

        let (c, _) = store.create().await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(matches!(
            store.read(&a, |_| ()).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(store.read(&b, |s| s.is_finished()).await.unwrap());

        // b (finished) goes next; c is still in progress and stays.
        store.create().await.unwrap();
        assert!(store.read(&c, |_| ()).await.is_ok());
        assert!(matches!(
            store.create().await,
            Err(SessionError::StoreFull { capacity: 2 })
        ));
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(1, VoteMode::Latest).with_idle_timeout(Duration::ZERO);
        let (a, _) = store.create().await.unwrap();

        // Unfinished but idle: dropped to make room.
        let (b, _) = store.create().await.unwrap();
        assert!(store.read(&a, |_| ()).await.is_err());
        assert_eq!(store.len().await, 1);

        assert_eq!(store.sweep_idle().await, 1);
        assert!(store.is_empty().await);
        assert!(store.read(&b, |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn fresh_sessions_survive_sweep() {
        let store = SessionStore::new(4, VoteMode::Latest);
        let (a, _) = store.create().await.unwrap();
        assert_eq!(store.idle_timeout(), DEFAULT_IDLE_TIMEOUT);
        assert_eq!(store.sweep_idle().await, 0);
        assert!(store.read(&a, |_| ()).await.is_ok());
    }
}

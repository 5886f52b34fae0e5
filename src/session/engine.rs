use rand::Rng;
use thiserror::Error;

use crate::progress::{ProgressError, ProgressReporter};
use crate::session::StudyQueue;
use crate::vocab::{VocabularyItem, WordPool};

/// Lifecycle of a learn session.
///
/// `Loading` only occurs while a restart's bulk reset is in flight (or stuck
/// after it failed); interaction is suppressed for its duration. `Completed`
/// is recoverable through `restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Completed,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no word is currently being shown")]
    NoCurrentWord,
    #[error("session is resetting")]
    Resetting,
}

/// Drives one learn session over a word pool.
///
/// The engine owns the queue: it is derived once at start and once per
/// restart, never re-derived as a side effect of rendering. Marking a word
/// known removes it from the pass and notifies the progress reporter;
/// marking it unknown recycles it to the back of the queue with no external
/// side effect.
pub struct SessionEngine {
    pool: WordPool,
    queue: StudyQueue,
    current: Option<usize>,
    phase: SessionPhase,
    reporter: Box<dyn ProgressReporter>,
    session_learned: usize,
    misses: usize,
    reset_error: Option<ProgressError>,
}

impl SessionEngine {
    pub fn start(pool: WordPool, reporter: Box<dyn ProgressReporter>) -> Self {
        Self::start_with_rng(pool, reporter, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        pool: WordPool,
        reporter: Box<dyn ProgressReporter>,
        rng: &mut R,
    ) -> Self {
        let queue = StudyQueue::build_with_rng(&pool, rng);
        let mut engine = Self {
            pool,
            queue,
            current: None,
            phase: SessionPhase::Active,
            reporter,
            session_learned: 0,
            misses: 0,
            reset_error: None,
        };
        engine.advance();
        engine
    }

    fn advance(&mut self) {
        self.current = self.queue.pop_front();
        self.phase = if self.current.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Completed
        };
    }

    fn require_active(&self) -> Result<usize, SessionError> {
        debug_assert!(
            self.phase != SessionPhase::Loading,
            "word resolution while the session is resetting"
        );
        if self.phase == SessionPhase::Loading {
            return Err(SessionError::Resetting);
        }
        debug_assert!(self.current.is_some(), "word resolution with no current word");
        self.current.ok_or(SessionError::NoCurrentWord)
    }

    /// Resolve the current word as known: flip its flag locally, notify the
    /// reporter, and move on. A reporter failure is logged and never retried;
    /// the local flag stays flipped either way.
    pub fn mark_known(&mut self) -> Result<(), SessionError> {
        let idx = self.require_active()?;
        self.pool.set_learned(idx, true);
        self.session_learned += 1;
        if let Some(word) = self.pool.get(idx) {
            let id = word.id.clone();
            if let Err(err) = self.reporter.on_known(&id) {
                log::warn!("failed to record `{id}` as learned: {err}");
            }
        }
        self.advance();
        Ok(())
    }

    /// Resolve the current word as still unknown: recycle it to the back of
    /// the queue so it comes around after every other waiting word.
    pub fn mark_unknown(&mut self) -> Result<(), SessionError> {
        let idx = self.require_active()?;
        self.misses += 1;
        self.queue.push_back(idx);
        self.advance();
        Ok(())
    }

    pub fn restart(&mut self) {
        self.restart_with_rng(&mut rand::thread_rng())
    }

    /// Reset every word in the pool to unlearned and begin a fresh pass.
    ///
    /// The bulk reset must land in the progress store before the session
    /// leaves `Loading`. On failure the session stays in `Loading` with the
    /// error retained for the caller to surface; calling `restart` again
    /// retries.
    pub fn restart_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.phase = SessionPhase::Loading;
        self.current = None;
        let ids = self.pool.ids();
        match self.reporter.on_bulk_reset(&ids) {
            Ok(()) => {
                self.reset_error = None;
                self.pool.clear_learned();
                self.session_learned = 0;
                self.misses = 0;
                self.queue = StudyQueue::build_with_rng(&self.pool, rng);
                self.advance();
            }
            Err(err) => {
                self.reset_error = Some(err);
            }
        }
    }

    pub fn new_pass(&mut self) {
        self.new_pass_with_rng(&mut rand::thread_rng())
    }

    /// Begin a fresh shuffled pass over the words still unlearned, keeping
    /// recorded progress as it stands.
    pub fn new_pass_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.session_learned = 0;
        self.misses = 0;
        self.queue = StudyQueue::build_with_rng(&self.pool, rng);
        self.advance();
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_word(&self) -> Option<&VocabularyItem> {
        self.current.and_then(|idx| self.pool.get(idx))
    }

    pub fn pool(&self) -> &WordPool {
        &self.pool
    }

    pub fn total(&self) -> usize {
        self.pool.len()
    }

    /// Words still in rotation, the current one included.
    pub fn remaining(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// Learned words in the pool, the ones that were already learned when
    /// the session started included.
    pub fn learned_count(&self) -> usize {
        self.total() - self.remaining()
    }

    /// Words marked known during this session only.
    pub fn session_learned(&self) -> usize {
        self.session_learned
    }

    /// Unknown resolutions during this session.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn reset_error(&self) -> Option<&ProgressError> {
        self.reset_error.as_ref()
    }

    /// Ids still in rotation: the current word first, then the queue in
    /// upcoming order.
    pub fn remaining_ids(&self) -> Vec<String> {
        self.current
            .iter()
            .chain(self.queue.iter())
            .filter_map(|&idx| self.pool.get(idx).map(|w| w.id.clone()))
            .collect()
    }
}

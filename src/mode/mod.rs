pub mod flashcard;
pub mod quiz;
pub mod typing;

pub use flashcard::FlashcardMode;
pub use quiz::QuizMode;
pub use typing::{answer_matches, TypingFeedback, TypingMode};

use crossterm::event::KeyEvent;
use std::time::Duration;

use crate::audio::AudioAnnouncer;
use crate::session::SessionEngine;

/// Delay before auto-advancing past a correctly answered word.
pub const CORRECT_DELAY: Duration = Duration::from_millis(800);
/// Longer delay after a wrong quiz answer, leaving time to read the correction.
pub const WRONG_DELAY: Duration = Duration::from_millis(1500);

/// How the user resolved the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Known,
    Unknown,
}

/// What a mode did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not a key this mode cares about; the caller may use it elsewhere.
    Ignored,
    /// Consumed, possibly mutating transient mode state.
    Handled,
    /// The key resolved the current word.
    Resolved(Outcome),
}

/// A resolution waiting out its feedback delay before it fires.
#[derive(Debug, Clone, Copy)]
pub struct PendingAdvance {
    outcome: Outcome,
    remaining: Duration,
}

impl PendingAdvance {
    pub fn new(outcome: Outcome, delay: Duration) -> Self {
        Self {
            outcome,
            remaining: delay,
        }
    }

    fn tick(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }
}

/// Count a pending resolution down; emit its outcome once the delay expires.
pub(crate) fn tick_pending(
    pending: &mut Option<PendingAdvance>,
    dt: Duration,
) -> Option<Outcome> {
    let expired = match pending.as_mut() {
        Some(p) => p.tick(dt),
        None => false,
    };
    if expired {
        pending.take().map(|p| p.outcome)
    } else {
        None
    }
}

/// The three interchangeable ways of answering: flip-and-self-assess,
/// multiple choice, and typed recall. Swapping modes mid-session only resets
/// the transient state held here; the engine's queue and current word are
/// untouched.
#[derive(Debug, Clone)]
pub enum ModeAdapter {
    Flashcard(FlashcardMode),
    Quiz(QuizMode),
    Typing(TypingMode),
}

impl ModeAdapter {
    pub fn flashcard() -> Self {
        ModeAdapter::Flashcard(FlashcardMode::new())
    }

    pub fn quiz() -> Self {
        ModeAdapter::Quiz(QuizMode::new())
    }

    pub fn typing() -> Self {
        ModeAdapter::Typing(TypingMode::new())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModeAdapter::Flashcard(_) => "flashcard",
            ModeAdapter::Quiz(_) => "quiz",
            ModeAdapter::Typing(_) => "typing",
        }
    }

    /// Reset transient state for the word the engine is now showing.
    pub fn begin_word(&mut self, engine: &SessionEngine, audio: &mut dyn AudioAnnouncer) {
        match self {
            ModeAdapter::Flashcard(m) => m.begin_word(engine, audio),
            ModeAdapter::Quiz(m) => m.begin_word(engine),
            ModeAdapter::Typing(m) => m.begin_word(),
        }
    }

    pub fn on_key(
        &mut self,
        key: KeyEvent,
        engine: &SessionEngine,
        audio: &mut dyn AudioAnnouncer,
    ) -> KeyResponse {
        match self {
            ModeAdapter::Flashcard(m) => m.on_key(key),
            ModeAdapter::Quiz(m) => m.on_key(key, engine, audio),
            ModeAdapter::Typing(m) => m.on_key(key, engine, audio),
        }
    }

    /// Advance feedback delays by one tick.
    pub fn tick(&mut self, dt: Duration) -> Option<Outcome> {
        match self {
            ModeAdapter::Flashcard(_) => None,
            ModeAdapter::Quiz(m) => m.tick(dt),
            ModeAdapter::Typing(m) => m.tick(dt),
        }
    }

    /// Whether the mode is sitting in a feedback delay and ignoring answers.
    pub fn is_locked(&self) -> bool {
        match self {
            ModeAdapter::Flashcard(_) => false,
            ModeAdapter::Quiz(m) => m.is_locked(),
            ModeAdapter::Typing(m) => m.is_locked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_advance_fires_after_its_delay() {
        let mut pending = Some(PendingAdvance::new(Outcome::Known, Duration::from_millis(250)));

        assert_eq!(tick_pending(&mut pending, Duration::from_millis(100)), None);
        assert_eq!(tick_pending(&mut pending, Duration::from_millis(100)), None);
        assert_eq!(
            tick_pending(&mut pending, Duration::from_millis(100)),
            Some(Outcome::Known)
        );
        assert!(pending.is_none());
    }

    #[test]
    fn tick_without_pending_is_a_no_op() {
        let mut pending = None;
        assert_eq!(tick_pending(&mut pending, Duration::from_millis(100)), None);
    }

    #[test]
    fn adapter_names() {
        assert_eq!(ModeAdapter::flashcard().name(), "flashcard");
        assert_eq!(ModeAdapter::quiz().name(), "quiz");
        assert_eq!(ModeAdapter::typing().name(), "typing");
    }
}

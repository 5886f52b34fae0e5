use crossterm::event::{KeyCode, KeyEvent};
use std::time::Duration;

use crate::audio::AudioAnnouncer;
use crate::mode::{tick_pending, KeyResponse, Outcome, PendingAdvance, CORRECT_DELAY};
use crate::session::SessionEngine;

/// Whether the typed answer counts: leading/trailing whitespace and letter
/// case never matter.
pub fn answer_matches(input: &str, headword: &str) -> bool {
    input.trim().to_lowercase() == headword.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingFeedback {
    #[default]
    Neutral,
    Correct,
    Wrong,
}

/// Typed-recall mode: the definition is the prompt and the headword is the
/// expected answer. A wrong submit reveals the answer and waits for an
/// explicit continue; editing the input withdraws the wrong state for
/// another try. Skipping is always possible and counts as unknown.
#[derive(Debug, Clone, Default)]
pub struct TypingMode {
    input: String,
    feedback: TypingFeedback,
    pending: Option<PendingAdvance>,
}

impl TypingMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_word(&mut self) {
        self.input.clear();
        self.feedback = TypingFeedback::Neutral;
        self.pending = None;
    }

    pub fn on_key(
        &mut self,
        key: KeyEvent,
        engine: &SessionEngine,
        audio: &mut dyn AudioAnnouncer,
    ) -> KeyResponse {
        // Input is frozen while the correct-answer delay runs out
        if self.pending.is_some() {
            return KeyResponse::Handled;
        }

        match key.code {
            KeyCode::Enter => self.submit(engine, audio),
            KeyCode::Tab => KeyResponse::Resolved(Outcome::Unknown),
            KeyCode::Backspace => {
                self.input.pop();
                self.withdraw_wrong();
                KeyResponse::Handled
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.withdraw_wrong();
                KeyResponse::Handled
            }
            _ => KeyResponse::Ignored,
        }
    }

    fn submit(
        &mut self,
        engine: &SessionEngine,
        audio: &mut dyn AudioAnnouncer,
    ) -> KeyResponse {
        match self.feedback {
            TypingFeedback::Neutral => {
                let headword = match engine.current_word() {
                    Some(word) => word.headword.clone(),
                    None => return KeyResponse::Handled,
                };
                audio.speak(&headword);
                if answer_matches(&self.input, &headword) {
                    self.feedback = TypingFeedback::Correct;
                    self.pending = Some(PendingAdvance::new(Outcome::Known, CORRECT_DELAY));
                } else {
                    self.feedback = TypingFeedback::Wrong;
                }
                KeyResponse::Handled
            }
            // The answer was revealed; this enter is the explicit continue
            TypingFeedback::Wrong => KeyResponse::Resolved(Outcome::Unknown),
            TypingFeedback::Correct => KeyResponse::Handled,
        }
    }

    fn withdraw_wrong(&mut self) {
        if self.feedback == TypingFeedback::Wrong {
            self.feedback = TypingFeedback::Neutral;
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Option<Outcome> {
        tick_pending(&mut self.pending, dt)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn feedback(&self) -> TypingFeedback {
        self.feedback
    }

    pub fn is_locked(&self) -> bool {
        self.pending.is_some()
    }
}

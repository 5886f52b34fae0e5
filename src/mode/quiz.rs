use crossterm::event::{KeyCode, KeyEvent};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use crate::audio::AudioAnnouncer;
use crate::mode::{tick_pending, KeyResponse, Outcome, PendingAdvance, CORRECT_DELAY, WRONG_DELAY};
use crate::session::SessionEngine;

const DISTRACTORS: usize = 3;

/// Multiple-choice mode: the current headword against four definitions, one
/// of them right. A selection locks the answer, plays the pronunciation, and
/// schedules the resolution behind a short feedback delay.
#[derive(Debug, Clone, Default)]
pub struct QuizMode {
    options: Vec<usize>,
    selected: Option<usize>,
    pending: Option<PendingAdvance>,
}

impl QuizMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_word(&mut self, engine: &SessionEngine) {
        self.begin_word_with_rng(engine, &mut rand::thread_rng());
    }

    /// Build the option set for the engine's current word: the word itself
    /// plus up to three distractors drawn uniformly from the rest of the
    /// pool, learned words included, then shuffled.
    pub fn begin_word_with_rng<R: Rng + ?Sized>(&mut self, engine: &SessionEngine, rng: &mut R) {
        self.selected = None;
        self.pending = None;
        self.options.clear();

        let current = match engine.current_index() {
            Some(idx) => idx,
            None => return,
        };

        let others: Vec<usize> = (0..engine.pool().len()).filter(|&i| i != current).collect();
        let mut options: Vec<usize> = others
            .choose_multiple(rng, DISTRACTORS)
            .copied()
            .collect();
        options.push(current);
        options.shuffle(rng);
        self.options = options;
    }

    /// Answer with the option at `choice`. Ignored once an answer is locked
    /// in or when the choice is out of range.
    pub fn select(
        &mut self,
        choice: usize,
        engine: &SessionEngine,
        audio: &mut dyn AudioAnnouncer,
    ) {
        if self.selected.is_some() || choice >= self.options.len() {
            return;
        }
        let current = match engine.current_index() {
            Some(idx) => idx,
            None => return,
        };

        self.selected = Some(choice);
        if let Some(word) = engine.current_word() {
            audio.speak(&word.headword);
        }

        let (outcome, delay) = if self.options[choice] == current {
            (Outcome::Known, CORRECT_DELAY)
        } else {
            (Outcome::Unknown, WRONG_DELAY)
        };
        self.pending = Some(PendingAdvance::new(outcome, delay));
    }

    pub fn on_key(
        &mut self,
        key: KeyEvent,
        engine: &SessionEngine,
        audio: &mut dyn AudioAnnouncer,
    ) -> KeyResponse {
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                let choice = (c as usize) - ('1' as usize);
                self.select(choice, engine, audio);
                KeyResponse::Handled
            }
            _ => KeyResponse::Ignored,
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Option<Outcome> {
        tick_pending(&mut self.pending, dt)
    }

    /// Pool indices of the displayed options, in display order.
    pub fn options(&self) -> &[usize] {
        &self.options
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_locked(&self) -> bool {
        self.selected.is_some()
    }
}

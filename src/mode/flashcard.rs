use crossterm::event::{KeyCode, KeyEvent};

use crate::audio::AudioAnnouncer;
use crate::mode::{KeyResponse, Outcome};
use crate::session::SessionEngine;

/// Flip-card mode: show the headword, flip to see the definitions, then
/// self-assess. The flip is presentation-only; the two resolution keys are
/// always available.
#[derive(Debug, Clone, Default)]
pub struct FlashcardMode {
    revealed: bool,
}

impl FlashcardMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_word(&mut self, engine: &SessionEngine, audio: &mut dyn AudioAnnouncer) {
        self.revealed = false;
        if let Some(word) = engine.current_word() {
            audio.speak(&word.headword);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyResponse {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.revealed = !self.revealed;
                KeyResponse::Handled
            }
            KeyCode::Char('g') => KeyResponse::Resolved(Outcome::Known),
            KeyCode::Char('a') => KeyResponse::Resolved(Outcome::Unknown),
            _ => KeyResponse::Ignored,
        }
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryProgress;
    use crate::vocab::{VocabularyItem, WordPool};
    use crossterm::event::KeyModifiers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct RecordingAnnouncer {
        spoken: Vec<String>,
    }

    impl AudioAnnouncer for RecordingAnnouncer {
        fn speak(&mut self, text: &str) {
            self.spoken.push(text.to_string());
        }
    }

    fn engine_of(headwords: &[&str]) -> SessionEngine {
        let items = headwords
            .iter()
            .map(|h| VocabularyItem {
                id: format!("w-{h}"),
                headword: h.to_string(),
                definitions: vec![format!("definition of {h}")],
                word_types: vec![],
                pronunciation: None,
                group: "test".to_string(),
                learned: false,
            })
            .collect();
        let pool = WordPool::new(items).unwrap();
        SessionEngine::start_with_rng(
            pool,
            Box::new(MemoryProgress::new()),
            &mut StdRng::seed_from_u64(11),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn begin_word_hides_the_back_and_announces() {
        let engine = engine_of(&["hund"]);
        let mut mode = FlashcardMode::new();
        let mut audio = RecordingAnnouncer::default();

        mode.revealed = true;
        mode.begin_word(&engine, &mut audio);

        assert!(!mode.revealed());
        assert_eq!(audio.spoken, vec!["hund".to_string()]);
    }

    #[test]
    fn space_flips_the_card() {
        let mut mode = FlashcardMode::new();

        assert_eq!(mode.on_key(key(KeyCode::Char(' '))), KeyResponse::Handled);
        assert!(mode.revealed());
        assert_eq!(mode.on_key(key(KeyCode::Char(' '))), KeyResponse::Handled);
        assert!(!mode.revealed());
    }

    #[test]
    fn resolution_keys_map_to_outcomes() {
        let mut mode = FlashcardMode::new();

        assert_eq!(
            mode.on_key(key(KeyCode::Char('g'))),
            KeyResponse::Resolved(Outcome::Known)
        );
        assert_eq!(
            mode.on_key(key(KeyCode::Char('a'))),
            KeyResponse::Resolved(Outcome::Unknown)
        );
    }

    #[test]
    fn unrelated_keys_pass_through() {
        let mut mode = FlashcardMode::new();
        assert_eq!(mode.on_key(key(KeyCode::Char('l'))), KeyResponse::Ignored);
        assert_eq!(mode.on_key(key(KeyCode::Up)), KeyResponse::Ignored);
    }
}

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::{ui::deck_stats::render_deck_stats, App, AppState};

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Study screen - renders the active session using the App widget
pub struct StudyScreen;

impl Screen for StudyScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Results screen - renders the pass summary using the App widget
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Deck stats screen - uses dedicated renderer
pub struct DeckStatsScreen;

impl Screen for DeckStatsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_deck_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Study => Box::new(StudyScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::DeckStats => Box::new(DeckStatsScreen),
    }
}

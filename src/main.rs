pub mod ui;

use flick::audio::{default_command, AudioAnnouncer, CommandAnnouncer, NullAnnouncer};
use flick::celebration::Confetti;
use flick::config::{Config, ConfigStore, FileConfigStore};
use flick::history::{HistoryLog, SessionRecord};
use flick::mode::{KeyResponse, ModeAdapter, Outcome};
use flick::progress::{MemoryProgress, ProgressReporter, SqliteProgressStore};
use flick::runtime::{CrosstermEventSource, Runner, StudyEvent};
use flick::session::{SessionEngine, SessionPhase};
use flick::vocab::{Deck, VocabularyItem, WordPool};

use chrono::{DateTime, Local};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Size,
    Frame, Terminal,
};
use std::{
    collections::HashSet,
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 100;
const RECENT_SESSIONS: usize = 5;

/// vocabulary flashcard tui with flip, quiz, and typing drills
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A vocabulary flashcard TUI that cycles a deck of words until every one is marked as known, with flip cards, multiple choice quizzes, typed recall, and persistent per-deck progress."
)]
pub struct Cli {
    /// deck to study: a built-in name or a path to a deck json file
    #[clap(short = 'd', long)]
    deck: Option<String>,

    /// restrict the session to one word group of the deck
    #[clap(short = 'g', long)]
    group: Option<String>,

    /// study mode to start in
    #[clap(short = 'm', long, value_enum)]
    mode: Option<StudyMode>,

    /// clear recorded progress and start over whenever every word is already learned
    #[clap(long)]
    auto_reset: bool,

    /// keep this run out of the progress database and session history
    #[clap(long)]
    no_progress: bool,

    /// do not speak words aloud
    #[clap(long)]
    no_sound: bool,

    /// command used to speak words, e.g. "espeak -v de"
    #[clap(long)]
    speech_cmd: Option<String>,

    /// list built-in decks and their groups, then exit
    #[clap(long)]
    list: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum StudyMode {
    Flashcard,
    Quiz,
    Typing,
}

impl StudyMode {
    fn from_name(name: &str) -> Self {
        match name {
            "quiz" => StudyMode::Quiz,
            "typing" => StudyMode::Typing,
            _ => StudyMode::Flashcard,
        }
    }

    fn as_adapter(&self) -> ModeAdapter {
        match self {
            StudyMode::Flashcard => ModeAdapter::flashcard(),
            StudyMode::Quiz => ModeAdapter::quiz(),
            StudyMode::Typing => ModeAdapter::typing(),
        }
    }
}

/// Effective settings for this run: the saved config with CLI overrides
/// applied on top.
#[derive(Debug, Clone)]
pub struct Settings {
    pub deck: String,
    pub group: Option<String>,
    pub mode: StudyMode,
    pub auto_reset: bool,
    pub sound: bool,
    pub speech_command: Option<String>,
    pub no_progress: bool,
}

impl Settings {
    fn merge(config: &Config, cli: &Cli) -> Self {
        Self {
            deck: cli.deck.clone().unwrap_or_else(|| config.deck.clone()),
            group: cli.group.clone().or_else(|| config.group.clone()),
            mode: cli
                .mode
                .unwrap_or_else(|| StudyMode::from_name(&config.mode)),
            auto_reset: cli.auto_reset || config.auto_reset,
            sound: !cli.no_sound && config.sound,
            speech_command: cli
                .speech_cmd
                .clone()
                .or_else(|| config.speech_command.clone()),
            no_progress: cli.no_progress,
        }
    }

    fn to_config(&self) -> Config {
        Config {
            deck: self.deck.clone(),
            group: self.group.clone(),
            mode: self.mode.to_string().to_lowercase(),
            auto_reset: self.auto_reset,
            sound: self.sound,
            speech_command: self.speech_command.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Study,
    Results,
    DeckStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsSort {
    Group,
    Learned,
    Total,
}

#[derive(Debug)]
pub struct DeckStatsState {
    pub scroll_offset: usize,
    pub sort_by: StatsSort,
    pub sort_ascending: bool,
}

impl Default for DeckStatsState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            sort_by: StatsSort::Group,
            sort_ascending: true,
        }
    }
}

pub struct App {
    pub engine: SessionEngine,
    pub adapter: ModeAdapter,
    pub state: AppState,
    pub settings: Settings,
    pub deck_name: String,
    pub stats_state: DeckStatsState,
    pub celebration: Confetti,
    pub audio: Box<dyn AudioAnnouncer>,
    pub history: Option<HistoryLog>,
    pub recent_sessions: Vec<SessionRecord>,
    pub last_studied: Option<DateTime<Local>>,
    pub baseline: HashSet<String>,
    pub started_at: Instant,
    pub config_store: FileConfigStore,
}

impl App {
    pub fn new(
        deck_name: String,
        words: Vec<VocabularyItem>,
        settings: Settings,
        config_store: FileConfigStore,
    ) -> Result<Self, Box<dyn Error>> {
        let mut pool = WordPool::new(words)?;
        let (reporter, last_studied): (Box<dyn ProgressReporter>, Option<DateTime<Local>>) =
            if settings.no_progress {
                (Box::new(MemoryProgress::new()), None)
            } else {
                let store = SqliteProgressStore::new(&deck_name)?;
                pool.hydrate(&store.learned_ids()?);
                let last = store.last_studied()?;
                (Box::new(store), last)
            };

        let mut engine = SessionEngine::start(pool, reporter);
        if settings.auto_reset && engine.is_complete() && engine.total() > 0 {
            engine.restart();
        }

        let history = if settings.no_progress {
            None
        } else {
            Some(HistoryLog::new())
        };
        let recent_sessions = match &history {
            Some(log) => log.recent(RECENT_SESSIONS).unwrap_or_else(|err| {
                log::warn!("failed to read session history: {err}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let baseline = baseline_of(&engine);
        let audio = build_announcer(&settings);
        let adapter = settings.mode.as_adapter();
        let state = if engine.is_complete() {
            AppState::Results
        } else {
            AppState::Study
        };

        let mut app = Self {
            engine,
            adapter,
            state,
            settings,
            deck_name,
            stats_state: DeckStatsState::default(),
            celebration: Confetti::new(),
            audio,
            history,
            recent_sessions,
            last_studied,
            baseline,
            started_at: Instant::now(),
            config_store,
        };
        if app.state == AppState::Study {
            app.begin_current_word();
        }
        Ok(app)
    }

    fn begin_current_word(&mut self) {
        self.adapter.begin_word(&self.engine, self.audio.as_mut());
    }

    /// Feed one key to the active mode; a resolved outcome is returned for
    /// the caller to apply.
    pub fn handle_study_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        match self.adapter.on_key(key, &self.engine, self.audio.as_mut()) {
            KeyResponse::Resolved(outcome) => Some(outcome),
            KeyResponse::Handled | KeyResponse::Ignored => None,
        }
    }

    /// Apply a resolution to the engine and move to the next word, or into
    /// the results screen when the pass is done.
    pub fn resolve(&mut self, outcome: Outcome, size: Size) {
        let result = match outcome {
            Outcome::Known => self.engine.mark_known(),
            Outcome::Unknown => self.engine.mark_unknown(),
        };
        if let Err(err) = result {
            log::debug!("dropping a word resolution: {err}");
            return;
        }

        if self.engine.is_complete() {
            self.finish_session(size);
        } else {
            self.begin_current_word();
        }
    }

    fn finish_session(&mut self, size: Size) {
        if self.engine.misses() == 0 && self.engine.session_learned() > 0 {
            self.celebration.start(size.width, size.height);
        }
        self.log_history();
        self.state = AppState::Results;
    }

    fn log_history(&mut self) {
        let log = match &self.history {
            Some(log) => log,
            None => return,
        };

        let record = SessionRecord {
            finished_at: Local::now(),
            deck: self.deck_name.clone(),
            group: self.settings.group.clone(),
            mode: self.settings.mode.to_string().to_lowercase(),
            total: self.engine.total(),
            learned: self.engine.session_learned(),
            misses: self.engine.misses(),
            duration_secs: self.started_at.elapsed().as_secs(),
        };

        if let Err(err) = log.append(&record) {
            log::warn!("failed to append session history: {err}");
        } else {
            self.recent_sessions.push(record);
        }
    }

    /// Reset recorded progress for the studied words and start over. On a
    /// failed reset the session stays put with the error on display;
    /// pressing restart again retries.
    pub fn restart_session(&mut self) {
        self.engine.restart();
        if self.engine.reset_error().is_some() {
            self.state = AppState::Study;
            return;
        }

        self.baseline.clear();
        self.started_at = Instant::now();
        self.stats_state = DeckStatsState::default();
        if self.engine.is_complete() {
            self.state = AppState::Results;
        } else {
            self.state = AppState::Study;
            self.begin_current_word();
        }
    }

    /// Start a fresh shuffled pass over whatever is still unlearned, keeping
    /// recorded progress.
    pub fn new_pass(&mut self) {
        self.engine.new_pass();
        if self.settings.auto_reset && self.engine.is_complete() && self.engine.total() > 0 {
            self.engine.restart();
            if self.engine.reset_error().is_some() {
                self.state = AppState::Study;
                return;
            }
        }

        self.baseline = baseline_of(&self.engine);
        self.started_at = Instant::now();
        self.stats_state = DeckStatsState::default();
        if self.engine.is_complete() {
            self.state = AppState::Results;
        } else {
            self.state = AppState::Study;
            self.begin_current_word();
        }
    }

    /// Switch the study mode in place; the word rotation is untouched.
    pub fn switch_mode(&mut self, mode: StudyMode) {
        if self.settings.mode == mode {
            return;
        }
        self.settings.mode = mode;
        self.adapter = mode.as_adapter();
        if self.engine.phase() == SessionPhase::Active {
            self.begin_current_word();
        }
        self.persist_config();
    }

    pub fn toggle_auto_reset(&mut self) {
        self.settings.auto_reset = !self.settings.auto_reset;
        self.persist_config();
    }

    fn persist_config(&self) {
        if let Err(err) = self.config_store.save(&self.settings.to_config()) {
            log::warn!("failed to save config: {err}");
        }
    }

    fn lookup_current(&self) {
        let word = match self.engine.current_word() {
            Some(word) => word,
            None => return,
        };
        if Browser::is_available() {
            webbrowser::open(&format!(
                "https://en.wiktionary.org/wiki/{}",
                word.headword
            ))
            .unwrap_or_default();
        }
    }
}

fn baseline_of(engine: &SessionEngine) -> HashSet<String> {
    engine
        .pool()
        .items()
        .iter()
        .filter(|w| w.learned)
        .map(|w| w.id.clone())
        .collect()
}

fn build_announcer(settings: &Settings) -> Box<dyn AudioAnnouncer> {
    if !settings.sound {
        return Box::new(NullAnnouncer);
    }
    let command = settings
        .speech_command
        .clone()
        .unwrap_or_else(|| default_command().to_string());
    match CommandAnnouncer::new(&command) {
        Some(announcer) => Box::new(announcer),
        None => Box::new(NullAnnouncer),
    }
}

fn list_decks() -> Result<(), Box<dyn Error>> {
    for name in Deck::builtin_names() {
        let deck = Deck::builtin(&name)?;
        println!("{} ({} words)", name, deck.words.len());
        for group in deck.groups() {
            println!("  {group}");
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        return list_decks();
    }

    let config_store = FileConfigStore::new();
    let settings = Settings::merge(&config_store.load(), &cli);

    let deck = match Deck::load(&settings.deck) {
        Ok(deck) => deck,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err.to_string()).exit();
        }
    };
    let words = match deck.scoped(settings.group.as_deref()) {
        Ok(words) => words,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err.to_string()).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(deck.name.clone(), words, settings, config_store)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

#[derive(Debug)]
enum ExitType {
    Restart,
    New,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        let mut exit_type: ExitType = ExitType::Quit;
        terminal.draw(|f| draw_ui(app, f))?;

        loop {
            match runner.step() {
                StudyEvent::Tick => {
                    let mut needs_draw = app.celebration.is_active;

                    if app.state == AppState::Study {
                        if app.adapter.is_locked() {
                            needs_draw = true;
                        }
                        if let Some(outcome) =
                            app.adapter.tick(Duration::from_millis(TICK_RATE_MS))
                        {
                            let size = terminal.size().unwrap_or_default();
                            app.resolve(outcome, size);
                            needs_draw = true;
                        }
                    }

                    app.celebration.update();

                    if needs_draw {
                        terminal.draw(|f| draw_ui(app, f))?;
                    }
                }
                StudyEvent::Resize => {
                    terminal.draw(|f| draw_ui(app, f))?;
                }
                StudyEvent::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        _ => match app.state {
                            AppState::Study => {
                                if app.engine.phase() == SessionPhase::Loading {
                                    // Only a retry gets through while a failed
                                    // reset is on display
                                    if key.code == KeyCode::Char('r') {
                                        exit_type = ExitType::Restart;
                                        break;
                                    }
                                } else {
                                    match key.code {
                                        KeyCode::F(1) => app.switch_mode(StudyMode::Flashcard),
                                        KeyCode::F(2) => app.switch_mode(StudyMode::Quiz),
                                        KeyCode::F(3) => app.switch_mode(StudyMode::Typing),
                                        // 'l' stays typeable in typed recall
                                        KeyCode::Char('l')
                                            if !matches!(app.adapter, ModeAdapter::Typing(_)) =>
                                        {
                                            app.lookup_current();
                                        }
                                        _ => {
                                            if let Some(outcome) = app.handle_study_key(key) {
                                                let size = terminal.size().unwrap_or_default();
                                                app.resolve(outcome, size);
                                            }
                                        }
                                    }
                                }
                            }
                            AppState::Results => match key.code {
                                KeyCode::Char('r') => {
                                    exit_type = ExitType::Restart;
                                    break;
                                }
                                KeyCode::Char('n') => {
                                    exit_type = ExitType::New;
                                    break;
                                }
                                KeyCode::Char('s') => {
                                    app.state = AppState::DeckStats;
                                }
                                KeyCode::Char('a') => {
                                    app.toggle_auto_reset();
                                }
                                _ => {}
                            },
                            AppState::DeckStats => match key.code {
                                KeyCode::Char('r') => {
                                    exit_type = ExitType::Restart;
                                    break;
                                }
                                KeyCode::Char('n') => {
                                    exit_type = ExitType::New;
                                    break;
                                }
                                KeyCode::Char('b') | KeyCode::Backspace => {
                                    app.state = AppState::Results;
                                }
                                KeyCode::Up => {
                                    app.stats_state.scroll_offset =
                                        app.stats_state.scroll_offset.saturating_sub(1);
                                }
                                KeyCode::Down => {
                                    // Clamped against the row count in the render
                                    app.stats_state.scroll_offset += 1;
                                }
                                KeyCode::PageUp => {
                                    app.stats_state.scroll_offset =
                                        app.stats_state.scroll_offset.saturating_sub(10);
                                }
                                KeyCode::PageDown => {
                                    app.stats_state.scroll_offset += 10;
                                }
                                KeyCode::Home => {
                                    app.stats_state.scroll_offset = 0;
                                }
                                KeyCode::Char('1') => {
                                    app.stats_state.sort_by = StatsSort::Group;
                                    app.stats_state.scroll_offset = 0;
                                }
                                KeyCode::Char('2') => {
                                    app.stats_state.sort_by = StatsSort::Learned;
                                    app.stats_state.scroll_offset = 0;
                                }
                                KeyCode::Char('3') => {
                                    app.stats_state.sort_by = StatsSort::Total;
                                    app.stats_state.scroll_offset = 0;
                                }
                                KeyCode::Char(' ') => {
                                    app.stats_state.sort_ascending =
                                        !app.stats_state.sort_ascending;
                                    app.stats_state.scroll_offset = 0;
                                }
                                _ => {}
                            },
                        },
                    }
                    terminal.draw(|f| draw_ui(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::Restart => {
                app.restart_session();
            }
            ExitType::New => {
                app.new_pass();
            }
            ExitType::Quit => {
                break;
            }
        }
    }

    Ok(())
}

fn draw_ui(app: &mut App, f: &mut Frame) {
    let screen = ui::screen::current_screen(&app.state);
    screen.render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn cli_defaults() -> Cli {
        Cli::parse_from(["flick"])
    }

    fn test_settings() -> Settings {
        Settings {
            deck: "everyday".to_string(),
            group: None,
            mode: StudyMode::Flashcard,
            auto_reset: false,
            sound: false,
            speech_command: None,
            no_progress: true,
        }
    }

    fn test_words(n: usize, learned: bool) -> Vec<VocabularyItem> {
        (0..n)
            .map(|i| VocabularyItem {
                id: format!("w-{i}"),
                headword: format!("wort{i}"),
                definitions: vec![format!("meaning {i}")],
                word_types: vec![],
                pronunciation: None,
                group: if i % 2 == 0 { "even" } else { "odd" }.to_string(),
                learned,
            })
            .collect()
    }

    fn test_app(words: Vec<VocabularyItem>, settings: Settings) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let app = App::new("everyday".to_string(), words, settings, store).unwrap();
        (app, dir)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = cli_defaults();

        assert_eq!(cli.deck, None);
        assert_eq!(cli.group, None);
        assert_eq!(cli.mode, None);
        assert!(!cli.auto_reset);
        assert!(!cli.no_progress);
        assert!(!cli.no_sound);
        assert_eq!(cli.speech_cmd, None);
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_deck_and_group() {
        let cli = Cli::parse_from(["flick", "-d", "academic", "-g", "science"]);
        assert_eq!(cli.deck.as_deref(), Some("academic"));
        assert_eq!(cli.group.as_deref(), Some("science"));

        let cli = Cli::parse_from(["flick", "--deck", "decks/my.json", "--group", "food"]);
        assert_eq!(cli.deck.as_deref(), Some("decks/my.json"));
        assert_eq!(cli.group.as_deref(), Some("food"));
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["flick", "-m", "quiz"]);
        assert_eq!(cli.mode, Some(StudyMode::Quiz));

        let cli = Cli::parse_from(["flick", "--mode", "typing"]);
        assert_eq!(cli.mode, Some(StudyMode::Typing));
    }

    #[test]
    fn test_study_mode_display_and_from_name() {
        assert_eq!(StudyMode::Flashcard.to_string(), "Flashcard");
        assert_eq!(StudyMode::Quiz.to_string(), "Quiz");
        assert_eq!(StudyMode::Typing.to_string(), "Typing");

        for mode in [StudyMode::Flashcard, StudyMode::Quiz, StudyMode::Typing] {
            assert_eq!(StudyMode::from_name(&mode.to_string().to_lowercase()), mode);
        }
        // Anything unrecognized falls back to flashcards
        assert_eq!(StudyMode::from_name("bogus"), StudyMode::Flashcard);
    }

    #[test]
    fn test_settings_merge_prefers_cli() {
        let config = Config {
            deck: "everyday".to_string(),
            group: Some("food".to_string()),
            mode: "typing".to_string(),
            auto_reset: false,
            sound: true,
            speech_command: None,
        };
        let cli = Cli::parse_from([
            "flick",
            "-d",
            "academic",
            "-g",
            "science",
            "-m",
            "quiz",
            "--auto-reset",
            "--no-sound",
            "--speech-cmd",
            "say -v Anna",
        ]);

        let settings = Settings::merge(&config, &cli);
        assert_eq!(settings.deck, "academic");
        assert_eq!(settings.group.as_deref(), Some("science"));
        assert_eq!(settings.mode, StudyMode::Quiz);
        assert!(settings.auto_reset);
        assert!(!settings.sound);
        assert_eq!(settings.speech_command.as_deref(), Some("say -v Anna"));
    }

    #[test]
    fn test_settings_merge_falls_back_to_config() {
        let config = Config {
            deck: "academic".to_string(),
            group: Some("humanities".to_string()),
            mode: "quiz".to_string(),
            auto_reset: true,
            sound: false,
            speech_command: Some("espeak -v de".to_string()),
        };

        let settings = Settings::merge(&config, &cli_defaults());
        assert_eq!(settings.deck, "academic");
        assert_eq!(settings.group.as_deref(), Some("humanities"));
        assert_eq!(settings.mode, StudyMode::Quiz);
        assert!(settings.auto_reset);
        assert!(!settings.sound);
        assert_eq!(settings.speech_command.as_deref(), Some("espeak -v de"));
    }

    #[test]
    fn test_settings_to_config_round_trip() {
        let settings = Settings {
            deck: "academic".to_string(),
            group: Some("science".to_string()),
            mode: StudyMode::Typing,
            auto_reset: true,
            sound: true,
            speech_command: Some("espeak".to_string()),
            no_progress: false,
        };

        let config = settings.to_config();
        assert_eq!(config.deck, "academic");
        assert_eq!(config.mode, "typing");

        let merged = Settings::merge(&config, &cli_defaults());
        assert_eq!(merged.mode, StudyMode::Typing);
        assert_eq!(merged.group.as_deref(), Some("science"));
        assert!(merged.auto_reset);
    }

    #[test]
    fn test_app_new_starts_studying() {
        let (app, _dir) = test_app(test_words(4, false), test_settings());

        assert_eq!(app.state, AppState::Study);
        assert_eq!(app.engine.total(), 4);
        assert_eq!(app.engine.remaining(), 4);
        assert!(app.engine.current_word().is_some());
        assert!(matches!(app.adapter, ModeAdapter::Flashcard(_)));
        assert!(app.baseline.is_empty());
    }

    #[test]
    fn test_app_new_all_learned_lands_on_results() {
        let (app, _dir) = test_app(test_words(3, true), test_settings());

        assert_eq!(app.state, AppState::Results);
        assert!(app.engine.is_complete());
        assert_eq!(app.baseline.len(), 3);
    }

    #[test]
    fn test_app_new_auto_reset_restarts_a_finished_deck() {
        let mut settings = test_settings();
        settings.auto_reset = true;
        let (app, _dir) = test_app(test_words(3, true), settings);

        assert_eq!(app.state, AppState::Study);
        assert_eq!(app.engine.remaining(), 3);
        assert!(app.baseline.is_empty());
    }

    #[test]
    fn test_app_new_empty_deck_lands_on_results() {
        let (app, _dir) = test_app(Vec::new(), test_settings());

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.engine.total(), 0);
    }

    #[test]
    fn test_resolve_known_until_results() {
        let (mut app, _dir) = test_app(test_words(2, false), test_settings());

        app.resolve(Outcome::Known, Size::default());
        assert_eq!(app.state, AppState::Study);
        assert_eq!(app.engine.remaining(), 1);

        app.resolve(Outcome::Known, Size::default());
        assert_eq!(app.state, AppState::Results);
        assert!(app.engine.is_complete());
        // A flawless pass gets the confetti
        assert!(app.celebration.is_active);
    }

    #[test]
    fn test_missed_pass_gets_no_celebration() {
        let (mut app, _dir) = test_app(test_words(1, false), test_settings());

        app.resolve(Outcome::Unknown, Size::default());
        assert_eq!(app.engine.misses(), 1);
        app.resolve(Outcome::Known, Size::default());

        assert_eq!(app.state, AppState::Results);
        assert!(!app.celebration.is_active);
    }

    #[test]
    fn test_switch_mode_keeps_the_rotation() {
        let (mut app, _dir) = test_app(test_words(5, false), test_settings());
        let current = app.engine.current_word().unwrap().id.clone();
        let order = app.engine.remaining_ids();

        app.switch_mode(StudyMode::Quiz);

        assert!(matches!(app.adapter, ModeAdapter::Quiz(_)));
        assert_eq!(app.engine.current_word().unwrap().id, current);
        assert_eq!(app.engine.remaining_ids(), order);
        assert_eq!(app.settings.mode, StudyMode::Quiz);
    }

    #[test]
    fn test_switch_mode_persists_config() {
        let (mut app, _dir) = test_app(test_words(4, false), test_settings());

        app.switch_mode(StudyMode::Typing);

        assert_eq!(app.config_store.load().mode, "typing");
    }

    #[test]
    fn test_toggle_auto_reset_persists_config() {
        let (mut app, _dir) = test_app(test_words(2, false), test_settings());
        assert!(!app.config_store.load().auto_reset);

        app.toggle_auto_reset();
        assert!(app.settings.auto_reset);
        assert!(app.config_store.load().auto_reset);

        app.toggle_auto_reset();
        assert!(!app.settings.auto_reset);
        assert!(!app.config_store.load().auto_reset);
    }

    #[test]
    fn test_restart_session_after_completion() {
        let (mut app, _dir) = test_app(test_words(2, false), test_settings());
        app.resolve(Outcome::Known, Size::default());
        app.resolve(Outcome::Known, Size::default());
        assert_eq!(app.state, AppState::Results);

        app.restart_session();

        assert_eq!(app.state, AppState::Study);
        assert_eq!(app.engine.remaining(), 2);
        assert_eq!(app.engine.session_learned(), 0);
        assert!(app.baseline.is_empty());
    }

    #[test]
    fn test_new_pass_keeps_recorded_progress() {
        let (mut app, _dir) = test_app(test_words(3, false), test_settings());
        app.resolve(Outcome::Known, Size::default());

        app.new_pass();

        assert_eq!(app.state, AppState::Study);
        assert_eq!(app.engine.remaining(), 2);
        assert_eq!(app.engine.learned_count(), 1);
        assert_eq!(app.baseline.len(), 1);
    }

    #[test]
    fn test_flashcard_key_resolution_round_trip() {
        let (mut app, _dir) = test_app(test_words(2, false), test_settings());

        // Flip, then mark known
        let flip = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(app.handle_study_key(flip), None);

        let known = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE);
        let outcome = app.handle_study_key(known);
        assert_eq!(outcome, Some(Outcome::Known));
    }

    #[test]
    fn test_history_skipped_without_progress() {
        let (mut app, _dir) = test_app(test_words(1, false), test_settings());
        app.resolve(Outcome::Known, Size::default());

        assert_eq!(app.state, AppState::Results);
        assert!(app.history.is_none());
        assert!(app.recent_sessions.is_empty());
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);

        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS <= 1000);
    }

    #[test]
    fn test_exit_type_debug() {
        assert_eq!(format!("{:?}", ExitType::Restart), "Restart");
        assert_eq!(format!("{:?}", ExitType::New), "New");
        assert_eq!(format!("{:?}", ExitType::Quit), "Quit");
    }

    #[test]
    fn test_app_state_variants() {
        assert_eq!(AppState::Study, AppState::Study);
        assert_ne!(AppState::Study, AppState::Results);
        assert_ne!(AppState::Results, AppState::DeckStats);
    }

    #[test]
    fn test_deck_stats_state_default() {
        let state = DeckStatsState::default();

        assert_eq!(state.scroll_offset, 0);
        assert!(matches!(state.sort_by, StatsSort::Group));
        assert!(state.sort_ascending);
    }

    #[test]
    fn test_build_announcer_honors_sound_setting() {
        let mut settings = test_settings();
        settings.sound = false;
        settings.speech_command = Some("definitely-not-a-speech-binary".to_string());

        // Muted settings never spawn anything; this would try the bogus
        // binary otherwise
        let mut announcer = build_announcer(&settings);
        announcer.speak("hallo");
    }
}

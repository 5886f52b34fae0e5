use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// What the main loop reacts to: a key press, a terminal resize, or the
/// periodic tick that drives feedback delays and animation.
#[derive(Clone, Debug)]
pub enum StudyEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where events come from. The production source reads crossterm on a
/// background thread; tests feed a channel by hand. This seam is what keeps
/// session flows driveable without a TTY.
pub trait EventSource: Send + 'static {
    /// Wait up to `wait` for the next event; `None` means nothing arrived.
    fn next_event(&self, wait: Duration) -> Option<StudyEvent>;
}

pub struct CrosstermEventSource {
    rx: Receiver<StudyEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || forward_terminal_events(tx));
        Self { rx }
    }
}

fn forward_terminal_events(tx: Sender<StudyEvent>) {
    loop {
        let forwarded = match event::read() {
            Ok(CtEvent::Key(key)) => tx.send(StudyEvent::Key(key)),
            Ok(CtEvent::Resize(..)) => tx.send(StudyEvent::Resize),
            // Mouse, focus and paste events are of no use here
            Ok(_) => Ok(()),
            Err(_) => break,
        };
        if forwarded.is_err() {
            // Receiver dropped, the app is shutting down
            break;
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn next_event(&self, wait: Duration) -> Option<StudyEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Channel-fed source for headless tests.
pub struct TestEventSource {
    rx: Receiver<StudyEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StudyEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn next_event(&self, wait: Duration) -> Option<StudyEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Pulls events for the main loop, turning quiet stretches into ticks.
pub struct Runner<E: EventSource> {
    source: E,
    tick: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self { source, tick }
    }

    /// Block for at most one tick interval; a timeout (or a disconnected
    /// source) comes back as `Tick` so delays keep counting down.
    pub fn step(&self) -> StudyEvent {
        self.source.next_event(self.tick).unwrap_or(StudyEvent::Tick)
    }
}

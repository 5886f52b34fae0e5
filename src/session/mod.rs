pub mod engine;
pub mod queue;

pub use engine::{SessionEngine, SessionError, SessionPhase};
pub use queue::StudyQueue;

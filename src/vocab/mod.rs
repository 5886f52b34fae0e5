pub mod deck;
pub mod pool;

pub use deck::{Deck, DeckError, VocabularyItem};
pub use pool::{PoolError, WordPool};

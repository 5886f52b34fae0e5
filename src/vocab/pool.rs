use std::collections::HashSet;
use thiserror::Error;

use crate::vocab::VocabularyItem;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("duplicate word id `{0}` in study pool")]
    DuplicateId(String),
}

/// Snapshot of the words in scope for one session.
///
/// The item list is fixed for the lifetime of the pool; only the per-item
/// `learned` flags change, and only through the session engine.
#[derive(Debug, Clone)]
pub struct WordPool {
    items: Vec<VocabularyItem>,
}

impl WordPool {
    pub fn new(items: Vec<VocabularyItem>) -> Result<Self, PoolError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.clone()) {
                return Err(PoolError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&VocabularyItem> {
        self.items.get(idx)
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|w| w.id.clone()).collect()
    }

    /// Indices of all items not yet marked learned, in pool order.
    pub fn unlearned_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.learned)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Mark every item whose id appears in `learned` as already learned.
    pub fn hydrate(&mut self, learned: &HashSet<String>) {
        for item in &mut self.items {
            item.learned = learned.contains(&item.id);
        }
    }

    pub(crate) fn set_learned(&mut self, idx: usize, learned: bool) {
        if let Some(item) = self.items.get_mut(idx) {
            item.learned = learned;
        }
    }

    pub(crate) fn clear_learned(&mut self) {
        for item in &mut self.items {
            item.learned = false;
        }
    }
}

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

use crate::vocab::WordPool;

/// Ordered working set of pool indices for one pass over the unlearned words.
///
/// Built exactly once per session start or restart; words leave through the
/// front and missed words rejoin at the back, so a missed word comes around
/// again only after everything else still waiting has been shown.
#[derive(Debug, Clone, Default)]
pub struct StudyQueue {
    indices: VecDeque<usize>,
}

impl StudyQueue {
    pub fn build(pool: &WordPool) -> Self {
        Self::build_with_rng(pool, &mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(pool: &WordPool, rng: &mut R) -> Self {
        let mut indices = pool.unlearned_indices();
        indices.shuffle(rng);
        Self {
            indices: indices.into(),
        }
    }

    pub fn pop_front(&mut self) -> Option<usize> {
        self.indices.pop_front()
    }

    pub fn push_back(&mut self, idx: usize) {
        self.indices.push_back(idx);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.indices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::VocabularyItem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool_of(n: usize, learned: &[usize]) -> WordPool {
        let items = (0..n)
            .map(|i| VocabularyItem {
                id: format!("w-{i}"),
                headword: format!("word{i}"),
                definitions: vec![format!("definition {i}")],
                word_types: vec![],
                pronunciation: None,
                group: "test".to_string(),
                learned: learned.contains(&i),
            })
            .collect();
        WordPool::new(items).unwrap()
    }

    #[test]
    fn build_skips_learned_words() {
        let pool = pool_of(5, &[1, 3]);
        let queue = StudyQueue::build(&pool);

        assert_eq!(queue.len(), 3);
        let mut contents: Vec<usize> = queue.iter().copied().collect();
        contents.sort_unstable();
        assert_eq!(contents, vec![0, 2, 4]);
    }

    #[test]
    fn build_is_a_permutation_of_the_unlearned_set() {
        let pool = pool_of(20, &[]);
        let queue = StudyQueue::build(&pool);

        let mut contents: Vec<usize> = queue.iter().copied().collect();
        contents.sort_unstable();
        assert_eq!(contents, (0..20).collect::<Vec<usize>>());
    }

    #[test]
    fn build_with_seeded_rng_is_deterministic() {
        let pool = pool_of(10, &[]);

        let a: Vec<usize> = StudyQueue::build_with_rng(&pool, &mut StdRng::seed_from_u64(7))
            .iter()
            .copied()
            .collect();
        let b: Vec<usize> = StudyQueue::build_with_rng(&pool, &mut StdRng::seed_from_u64(7))
            .iter()
            .copied()
            .collect();

        assert_eq!(a, b);
    }

    #[test]
    fn recycle_moves_word_to_the_back() {
        let pool = pool_of(3, &[]);
        let mut queue = StudyQueue::build_with_rng(&pool, &mut StdRng::seed_from_u64(1));

        let first = queue.pop_front().unwrap();
        queue.push_back(first);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.iter().last(), Some(&first));
    }

    #[test]
    fn empty_pool_builds_empty_queue() {
        let pool = pool_of(0, &[]);
        let mut queue = StudyQueue::build(&pool);

        assert!(queue.is_empty());
        assert_eq!(queue.pop_front(), None);
    }
}

//! Seeded round picking.
//!
//! An LCG is enough here: the only consumer draws a handful of distinct rounds
//! from a pool, and a fixed seed must give the same game every time.

#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would stay zero.
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Numerical Recipes constants, mod 2^32.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `[0, max)`; `max` must be non-zero.
    pub fn next_below(&mut self, max: usize) -> usize {
        (self.next_u32() as usize) % max
    }

    /// Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_below(i + 1);
            slice.swap(i, j);
        }
    }

    /// Up to `count` distinct indices into a pool of `pool_len`, in draw order.
    pub fn pick_distinct(&mut self, pool_len: usize, count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..pool_len).collect();
        self.shuffle(&mut indices);
        indices.truncate(count);
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), rng.next_u32());
    }

    #[test]
    fn pick_distinct_never_repeats() {
        let mut rng = SimpleRng::new(7);
        let picked = rng.pick_distinct(20, 5);
        assert_eq!(picked.len(), 5);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(picked.iter().all(|&i| i < 20));
    }

    #[test]
    fn pick_distinct_caps_at_pool_size() {
        let mut rng = SimpleRng::new(7);
        let mut picked = rng.pick_distinct(3, 10);
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2]);
        assert!(rng.pick_distinct(0, 4).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn pick_distinct_is_a_partial_permutation(
            seed in proptest::prelude::any::<u32>(),
            pool in 0usize..64,
            count in 0usize..80,
        ) {
            let picked = SimpleRng::new(seed).pick_distinct(pool, count);
            proptest::prop_assert_eq!(picked.len(), count.min(pool));
            let unique: HashSet<_> = picked.iter().copied().collect();
            proptest::prop_assert_eq!(unique.len(), picked.len());
            proptest::prop_assert!(picked.iter().all(|&i| i < pool));
        }
    }
}

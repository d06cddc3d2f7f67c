//! Seeded dataset splits over example indices

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Absorbs binary representation error in `fraction * n` (0.9 * 20000)
const ROUNDING_SLACK: f64 = 1e-9;

fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    indices
}

/// Randomly split `n` indices into two subsets of `fraction` and `1 - fraction`
///
/// The first subset gets `floor(fraction * n)` indices, the second the rest.
pub fn random_split(n: usize, fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let first_len = ((fraction * n as f64 + ROUNDING_SLACK).floor() as usize).min(n);

    let mut perm = permutation(n, seed);
    let second = perm.split_off(first_len);
    (perm, second)
}

/// Split `n` indices into `(train, test)` with `ceil(test_size * n)` test rows
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_test = (test_size * n as f64 - ROUNDING_SLACK).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(Error::ConfigError(format!(
            "test_size {test_size} leaves an empty split for {n} examples"
        )));
    }
    let mut perm = permutation(n, seed);
    let train = perm.split_off(n_test);
    Ok((train, perm))
}

/// Gather `items[i]` for each index, in index order
pub fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_random_split_lengths() {
        let (a, b) = random_split(20_000, 0.9, 42);
        assert_eq!(a.len(), 18_000);
        assert_eq!(b.len(), 2_000);

        let (a, b) = random_split(7, 0.9, 42);
        assert_eq!(a.len(), 6);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_train_test_split_rounds_test_up() {
        let (train, test) = train_test_split(4, 0.2, 42).unwrap();
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 3);

        let (train, test) = train_test_split(20_000, 0.2, 42).unwrap();
        assert_eq!(test.len(), 4_000);
        assert_eq!(train.len(), 16_000);
    }

    #[test]
    fn test_train_test_split_reproducible() {
        assert_eq!(train_test_split(100, 0.2, 42).unwrap(), train_test_split(100, 0.2, 42).unwrap());
        assert_ne!(train_test_split(100, 0.2, 42).unwrap(), train_test_split(100, 0.2, 7).unwrap());
    }

    #[test]
    fn test_train_test_split_rejects_empty_side() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(0, 0.2, 42).is_err());
    }

    #[test]
    fn test_select() {
        let items = vec!['a', 'b', 'c', 'd'];
        assert_eq!(select(&items, &[3, 0]), vec!['d', 'a']);
    }

    proptest! {
        #[test]
        fn prop_random_split_is_partition(n in 0usize..500, fraction in 0.05f64..0.95, seed in any::<u64>()) {
            let (a, b) = random_split(n, fraction, seed);
            let mut all: Vec<usize> = a.into_iter().chain(b).collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
        }

        #[test]
        fn prop_train_test_split_is_partition(n in 5usize..500, seed in any::<u64>()) {
            let (train, test) = train_test_split(n, 0.2, seed).unwrap();
            prop_assert!(!test.is_empty());
            prop_assert!((test.len() as f64 - 0.2 * n as f64).abs() < 1.0);
            let mut all: Vec<usize> = train.into_iter().chain(test).collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
        }
    }
}

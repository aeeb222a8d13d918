//! Fixed-capacity append-only record store.
//!
//! Storage is an inline array sized at compile time; nothing allocates after
//! construction. Once full, further pushes are dropped and counted. Earlier
//! entries are never overwritten.

use serde::{Serialize, Serializer};

#[derive(Clone)]
pub struct BoundedLog<T: Copy + Default, const N: usize> {
    items: [T; N],
    len: usize,
    dropped: u32,
}

impl<T: Copy + Default, const N: usize> BoundedLog<T, N> {
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Append `item`. Returns `false` when the log is saturated.
    pub fn push(&mut self, item: T) -> bool {
        if self.len >= N {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        self.items[self.len] = item;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    /// Writes rejected since the last `clear`.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Resets the cursor. Old slots are left in place and overwritten by
    /// later pushes.
    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for BoundedLog<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default + std::fmt::Debug, const N: usize> std::fmt::Debug for BoundedLog<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedLog")
            .field("capacity", &N)
            .field("items", &self.as_slice())
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<'a, T: Copy + Default, const N: usize> IntoIterator for &'a BoundedLog<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Copy + Default + Serialize, const N: usize> Serialize for BoundedLog<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut log: BoundedLog<u32, 3> = BoundedLog::new();
        assert!(log.is_empty());
        assert!(log.push(1));
        assert!(log.push(2));
        assert!(log.push(3));
        assert!(log.is_full());
        assert!(!log.push(4));
        assert!(!log.push(5));
        assert_eq!(log.as_slice(), &[1, 2, 3]);
        assert_eq!(log.dropped(), 2);
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut log: BoundedLog<u8, 2> = BoundedLog::new();
        log.push(7);
        log.push(8);
        log.push(9);
        log.clear();
        assert_eq!(log.len(), 0);
        assert_eq!(log.dropped(), 0);
        log.push(1);
        assert_eq!(log.as_slice(), &[1]);
    }

    #[test]
    fn test_serializes_filled_prefix_only() {
        let mut log: BoundedLog<u16, 8> = BoundedLog::new();
        log.push(10);
        log.push(20);
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, "[10,20]");
    }

    #[test]
    fn test_zero_capacity_never_accepts() {
        let mut log: BoundedLog<u8, 0> = BoundedLog::new();
        assert!(!log.push(1));
        assert!(log.is_full());
        assert_eq!(log.dropped(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the filled prefix always equals the first N pushes
            #[test]
            fn prop_saturates_without_corruption(values in proptest::collection::vec(any::<u32>(), 0..64)) {
                let mut log: BoundedLog<u32, 16> = BoundedLog::new();
                for v in &values {
                    log.push(*v);
                }
                let expected_len = values.len().min(16);
                prop_assert_eq!(log.len(), expected_len);
                prop_assert_eq!(log.as_slice(), &values[..expected_len]);
                prop_assert_eq!(log.dropped() as usize, values.len() - expected_len);
            }
        }
    }
}

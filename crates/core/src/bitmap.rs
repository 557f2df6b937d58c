//! Packed validity bitmap.
//!
//! Bits are stored little-endian within each `u64` word: bit 0 is the LSB of
//! word 0. A set bit marks a valid (non-null) row.

use alloc::vec;
use alloc::vec::Vec;

/// A compact bit vector tracking which rows of a column hold a value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

impl Bitmap {
    /// Creates an empty bitmap.
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            ones: 0,
        }
    }

    /// Creates an empty bitmap with room for `bits` pushes.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
            ones: 0,
        }
    }

    /// Creates a bitmap of `len` set bits (every row valid).
    pub fn all_valid(len: usize) -> Self {
        if len == 0 {
            return Self::new();
        }
        let mut words = vec![u64::MAX; len.div_ceil(64)];
        let rem = len % 64;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << rem) - 1;
            }
        }
        Self {
            words,
            len,
            ones: len,
        }
    }

    /// Creates a bitmap of `len` unset bits (every row null).
    pub fn all_null(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
            ones: 0,
        }
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitmap holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends one bit.
    pub fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }
        if value {
            self.words[self.len / 64] |= 1u64 << bit;
            self.ones += 1;
        }
        self.len += 1;
    }

    /// Returns the bit at `index`. Out-of-range indices read as unset.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Number of set bits (valid rows).
    #[inline]
    pub fn count_valid(&self) -> usize {
        self.ones
    }

    /// Number of unset bits (null rows).
    #[inline]
    pub fn count_null(&self) -> usize {
        self.len - self.ones
    }

    /// Returns true if every bit is set.
    #[inline]
    pub fn all_set(&self) -> bool {
        self.ones == self.len
    }

    /// Underlying words.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    /// Bitwise AND of two equal-length bitmaps.
    pub fn and(&self, other: &Bitmap) -> Bitmap {
        debug_assert_eq!(self.len, other.len, "Bitmap length mismatch");
        let words: Vec<u64> = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| a & b)
            .collect();
        let ones = words.iter().map(|w| w.count_ones() as usize).sum();
        Bitmap {
            words,
            len: self.len.min(other.len),
            ones,
        }
    }

    /// Iterates the bits in row order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Builds a bitmap from a slice of booleans.
    pub fn from_bools(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bitmap = Bitmap::with_capacity(iter.size_hint().0);
        for bit in iter {
            bitmap.push(bit);
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid_masks_tail() {
        let b = Bitmap::all_valid(70);
        assert_eq!(b.len(), 70);
        assert_eq!(b.count_valid(), 70);
        assert!(b.get(69));
        assert!(!b.get(70));
        assert_eq!(b.as_words()[1], (1u64 << 6) - 1);
    }

    #[test]
    fn test_all_null() {
        let b = Bitmap::all_null(10);
        assert_eq!(b.count_null(), 10);
        assert!(!b.get(3));
    }

    #[test]
    fn test_push_and_get() {
        let mut b = Bitmap::new();
        for i in 0..130 {
            b.push(i % 3 == 0);
        }
        assert_eq!(b.len(), 130);
        assert!(b.get(0));
        assert!(!b.get(1));
        assert!(b.get(129));
        assert_eq!(b.count_valid(), 44);
    }

    #[test]
    fn test_and() {
        let a = Bitmap::from_bools(&[true, true, false, false]);
        let b = Bitmap::from_bools(&[true, false, true, false]);
        let c = a.and(&b);
        assert_eq!(c.iter().collect::<Vec<_>>(), vec![true, false, false, false]);
        assert_eq!(c.count_valid(), 1);
    }

    #[test]
    fn test_empty() {
        let b = Bitmap::all_valid(0);
        assert!(b.is_empty());
        assert!(b.all_set());
    }
}

//! Facts and the per-instruction fact store.
//!
//! A [`Fact`] is a fixed-width bit set over a [`Domain`](super::Domain): bit `i` set means the
//! element with index `i` holds at the program point the fact describes. Facts are partially
//! ordered by subset inclusion, which is the order every meet and transfer operator must be
//! monotone in.
//!
//! The [`FactStore`] maps every instruction of the analyzed function to exactly one fact. It is
//! seeded with the initial condition when the solver initializes and only ever updated in place
//! afterwards; entries are never added or removed during a run.
//!
//! # Example
//!
//! ```rust
//! use flowscope::analysis::Fact;
//!
//! let mut fact = Fact::new(100);
//! fact.insert(0);
//! fact.insert(50);
//! fact.insert(99);
//!
//! assert!(fact.contains(50));
//! assert_eq!(fact.count(), 3);
//! assert_eq!(fact.iter().collect::<Vec<_>>(), vec![0, 50, 99]);
//! ```

use std::{collections::HashMap, fmt, hash::Hash};

const WORD_BITS: usize = 64;

/// A set of domain indices, stored as packed 64-bit words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    words: Vec<u64>,
    width: usize,
}

impl Fact {
    /// Creates an empty fact over a domain of `width` elements.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0; width.div_ceil(WORD_BITS)],
            width,
        }
    }

    /// Creates a fact in which every element of a `width`-element domain holds.
    #[must_use]
    pub fn full(width: usize) -> Self {
        let mut fact = Self::new(width);
        fact.fill();
        fact
    }

    /// Creates a fact holding exactly the given indices.
    ///
    /// # Panics
    ///
    /// Panics if an index is `>= width`.
    #[must_use]
    pub fn from_indices(width: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut fact = Self::new(width);
        for index in indices {
            fact.insert(index);
        }
        fact
    }

    /// Returns the size of the domain this fact ranges over.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns `true` if no element holds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of elements that hold.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Marks `index` as holding. Returns `true` if the fact changed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn insert(&mut self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        let changed = self.words[word] & mask == 0;
        self.words[word] |= mask;
        changed
    }

    /// Marks `index` as not holding. Returns `true` if the fact changed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn remove(&mut self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        let changed = self.words[word] & mask != 0;
        self.words[word] &= !mask;
        changed
    }

    /// Returns `true` if `index` holds.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask != 0
    }

    /// Clears every element.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Sets every element.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        let tail = self.width % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
    }

    /// In-place union. Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn union_with(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a | b)
    }

    /// In-place intersection. Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn intersect_with(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a & b)
    }

    /// Removes every element of `other` from `self`. Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn difference_with(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a & !b)
    }

    /// Returns `true` if every element of `self` also holds in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.assert_same_width(other);
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| a & !b == 0)
    }

    /// Returns an iterator over the indices that hold, in ascending order.
    #[must_use]
    pub fn iter(&self) -> FactIter<'_> {
        FactIter {
            fact: self,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.width,
            "domain index {index} out of range for a fact of width {}",
            self.width
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    fn assert_same_width(&self, other: &Self) {
        assert_eq!(
            self.width, other.width,
            "facts over different domains can not be combined"
        );
    }

    fn combine(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) -> bool {
        self.assert_same_width(other);
        let mut changed = false;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            let old = *a;
            *a = op(old, *b);
            changed |= old != *a;
        }
        changed
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Fact {
    type Item = usize;
    type IntoIter = FactIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the indices set in a [`Fact`].
pub struct FactIter<'a> {
    fact: &'a Fact,
    word_idx: usize,
    current: u64,
}

impl Iterator for FactIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
            self.current = *self.fact.words.get(self.word_idx)?;
        }
    }
}

/// Union of `facts`, or the empty fact of `width` if there are none.
///
/// This is the meet of may-analyses such as liveness and reaching definitions.
#[must_use]
pub fn union_of<'a>(width: usize, facts: impl IntoIterator<Item = &'a Fact>) -> Fact {
    let mut result = Fact::new(width);
    for fact in facts {
        result.union_with(fact);
    }
    result
}

/// Intersection of `facts`, or the full fact of `width` if there are none.
///
/// This is the meet of must-analyses such as available expressions.
#[must_use]
pub fn intersection_of<'a>(width: usize, facts: impl IntoIterator<Item = &'a Fact>) -> Fact {
    let mut result = Fact::full(width);
    for fact in facts {
        result.intersect_with(fact);
    }
    result
}

/// Mapping from instruction handle to the fact its transfer function produced.
#[derive(Debug, Clone)]
pub struct FactStore<I> {
    facts: HashMap<I, Fact>,
}

impl<I: Copy + Eq + Hash> FactStore<I> {
    /// Creates an empty store with room for `capacity` instructions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            facts: HashMap::with_capacity(capacity),
        }
    }

    /// Seeds the entry of `inst` with the initial condition.
    ///
    /// # Panics
    ///
    /// Panics if `inst` was already seeded.
    pub fn seed(&mut self, inst: I, initial: Fact) {
        let previous = self.facts.insert(inst, initial);
        assert!(previous.is_none(), "instruction seeded twice");
    }

    /// Stores the fact produced by the transfer function of `inst`.
    ///
    /// Returns `true` if the stored fact differs from the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `inst` was never seeded, or if the new fact has a different width.
    pub fn update(&mut self, inst: I, fact: Fact) -> bool {
        let Some(slot) = self.facts.get_mut(&inst) else {
            panic!("fact store has no entry for the instruction; it was not seeded");
        };
        assert_eq!(
            slot.width(),
            fact.width(),
            "transfer function produced a fact over a different domain"
        );
        if *slot == fact {
            return false;
        }
        *slot = fact;
        true
    }

    /// Returns the fact attributed to `inst`.
    #[must_use]
    pub fn get(&self, inst: I) -> Option<&Fact> {
        self.facts.get(&inst)
    }

    /// Returns the number of instructions in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if the store holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns an iterator over all `(instruction, fact)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &Fact)> + '_ {
        self.facts.iter().map(|(inst, fact)| (*inst, fact))
    }
}

impl<I: Copy + Eq + Hash> Default for FactStore<I> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

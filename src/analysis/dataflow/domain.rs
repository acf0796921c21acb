//! The finite set of elements an analysis tracks.
//!
//! A domain is built once per run from what the analysis collects over every instruction, then
//! frozen. Construction and lookup are separate types: [`DomainBuilder`] can only grow and
//! [`Domain`] can only be read, so there is no way to add an element after facts sized to the
//! domain exist.
//!
//! Indices are assigned in first-insertion order. Because the solver collects in block order
//! and then instruction order, the same graph always produces the same domain numbering, which
//! in turn makes fact dumps reproducible.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use crate::analysis::dataflow::Fact;

/// Bound for types that can be tracked as domain elements.
///
/// Implemented for every type that meets the bounds; analyses never implement it by hand.
pub trait DomainElement: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> DomainElement for T {}

/// Accumulates domain elements during the collection phase.
#[derive(Debug, Clone)]
pub struct DomainBuilder<E> {
    elements: Vec<E>,
    index: HashMap<E, usize>,
}

impl<E: DomainElement> DomainBuilder<E> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds `element` if it is not present yet.
    ///
    /// Returns the index of the element; inserting a duplicate returns the existing index.
    pub fn insert(&mut self, element: E) -> usize {
        if let Some(&existing) = self.index.get(&element) {
            return existing;
        }
        let idx = self.elements.len();
        self.index.insert(element.clone(), idx);
        self.elements.push(element);
        idx
    }

    /// Returns `true` if `element` was already inserted.
    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.index.contains_key(element)
    }

    /// Returns the number of distinct elements inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ends collection.
    #[must_use]
    pub fn freeze(self) -> Domain<E> {
        Domain {
            elements: self.elements,
            index: self.index,
        }
    }
}

impl<E: DomainElement> Default for DomainBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainElement> Extend<E> for DomainBuilder<E> {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        for element in iter {
            self.insert(element);
        }
    }
}

/// The frozen, indexed set of elements an analysis run tracks.
///
/// Every [`Fact`] of a run has exactly [`len`](Self::len) bits, one per element.
#[derive(Debug, Clone)]
pub struct Domain<E> {
    elements: Vec<E>,
    index: HashMap<E, usize>,
}

impl<E: DomainElement> Domain<E> {
    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the domain has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the index of `element`, if it is part of the domain.
    #[must_use]
    pub fn index_of(&self, element: &E) -> Option<usize> {
        self.index.get(element).copied()
    }

    /// Returns `true` if `element` is part of the domain.
    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.index.contains_key(element)
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &E> + '_ {
        self.elements.iter()
    }

    /// Returns an empty fact sized to this domain.
    #[must_use]
    pub fn empty_fact(&self) -> Fact {
        Fact::new(self.len())
    }

    /// Returns a fact in which every element holds.
    #[must_use]
    pub fn full_fact(&self) -> Fact {
        Fact::full(self.len())
    }

    /// Builds a fact from elements. Elements outside the domain are ignored.
    pub fn fact_of<'a>(&self, elements: impl IntoIterator<Item = &'a E>) -> Fact
    where
        E: 'a,
    {
        let mut fact = self.empty_fact();
        for idx in elements.into_iter().filter_map(|e| self.index_of(e)) {
            fact.insert(idx);
        }
        fact
    }

    /// Decodes a fact back into the elements it holds, in index order.
    ///
    /// # Panics
    ///
    /// Panics if `fact` is wider than this domain.
    pub fn decode<'a>(&'a self, fact: &'a Fact) -> impl Iterator<Item = &'a E> + 'a {
        assert!(
            fact.width() <= self.len(),
            "fact of width {} does not belong to a domain of {} elements",
            fact.width(),
            self.len()
        );
        fact.iter().map(|idx| &self.elements[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_index_order() {
        let mut builder = DomainBuilder::new();
        assert_eq!(builder.insert("c"), 0);
        assert_eq!(builder.insert("a"), 1);
        assert_eq!(builder.insert("c"), 0);
        assert_eq!(builder.insert("b"), 2);
        assert_eq!(builder.len(), 3);
        assert!(builder.contains(&"a"));

        let domain = builder.freeze();
        assert_eq!(domain.iter().copied().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(domain.index_of(&"b"), Some(2));
        assert_eq!(domain.index_of(&"z"), None);
        assert_eq!(domain.element(1), Some(&"a"));
        assert_eq!(domain.element(3), None);
    }

    #[test]
    fn test_fact_encoding() {
        let mut builder = DomainBuilder::new();
        builder.extend([10u32, 20, 30, 40]);
        let domain = builder.freeze();

        let fact = domain.fact_of(&[40, 20, 99]);
        assert_eq!(fact.width(), 4);
        assert_eq!(fact.iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(domain.decode(&fact).copied().collect::<Vec<_>>(), vec![20, 40]);

        assert!(domain.empty_fact().is_empty());
        assert_eq!(domain.full_fact().count(), 4);
    }

    #[test]
    fn test_empty_domain() {
        let domain: Domain<u8> = DomainBuilder::default().freeze();
        assert!(domain.is_empty());
        assert_eq!(domain.empty_fact().width(), 0);
        assert_eq!(domain.decode(&domain.full_fact()).count(), 0);
    }
}

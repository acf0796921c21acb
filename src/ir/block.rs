//! Basic blocks.
//!
//! A [`Block`] is an ordered list of instruction handles. The instructions themselves live in the
//! function's instruction table; the block only fixes their program order. Control flow edges are
//! implied by the block terminator and materialized by the function as predecessor and successor
//! lists.

use std::fmt;

use crate::ir::InstId;

/// A strongly-typed identifier for a basic block within a function.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// Creates a new block identifier from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block: a straight-line sequence of instructions ending in a terminator.
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    name: Option<String>,
    instructions: Vec<InstId>,
}

impl Block {
    pub(crate) fn new(id: BlockId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            instructions: Vec::new(),
        }
    }

    /// Returns the identifier of this block.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the user-assigned label, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the instructions of this block in program order.
    #[must_use]
    pub fn instructions(&self) -> &[InstId] {
        &self.instructions
    }

    /// Returns the number of instructions in this block.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the last instruction in program order.
    #[must_use]
    pub fn last(&self) -> Option<InstId> {
        self.instructions.last().copied()
    }

    pub(crate) fn push(&mut self, inst: InstId) {
        self.instructions.push(inst);
    }
}

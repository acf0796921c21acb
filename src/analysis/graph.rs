//! The program graph abstraction consumed by the data flow engine.
//!
//! The engine never inspects a concrete IR. Everything it needs (block order, instruction order,
//! CFG edges, def/use information and merge instructions) is requested through
//! [`ProgramGraph`]. Handles are plain copyable identifiers; identity is handle equality, never
//! the address of some backing storage.

use std::{fmt::Debug, hash::Hash};

/// Read-only view of one function's control flow graph and def/use structure.
///
/// Implementations must be deterministic: iterating the same graph twice yields the same
/// sequences. The solver relies on this to make its results reproducible.
///
/// # Requirements
///
/// - every block returned by [`blocks`](Self::blocks) is non-empty when the solver runs with
///   graph validation disabled (validation rejects empty blocks otherwise)
/// - [`predecessors`](Self::predecessors) and [`successors`](Self::successors) describe the same
///   edge set from both ends
/// - for a merge instruction, [`operands`](Self::operands) yields the incoming values and
///   [`incoming`](Self::incoming) pairs each of them with its predecessor block
/// - merge instructions lead their block: no merge follows an ordinary instruction
pub trait ProgramGraph {
    /// Handle of a basic block.
    type Block: Copy + Eq + Hash + Debug;
    /// Handle of an instruction.
    type Inst: Copy + Eq + Hash + Debug;
    /// Handle of a value (argument, instruction result or constant).
    ///
    /// Values are the usual domain elements, so they must be shareable across threads.
    type Value: Copy + Eq + Hash + Debug + Send + Sync;

    /// Returns the function entry block, or `None` for a function without a body.
    fn entry_block(&self) -> Option<Self::Block>;

    /// Returns all blocks in program order. Reverse program order is `.rev()` of this.
    fn blocks(&self) -> impl DoubleEndedIterator<Item = Self::Block> + '_;

    /// Returns the instructions of `block` in program order.
    fn instructions(&self, block: Self::Block) -> impl DoubleEndedIterator<Item = Self::Inst> + '_;

    /// Returns the blocks with an edge into `block`.
    fn predecessors(&self, block: Self::Block) -> impl Iterator<Item = Self::Block> + '_;

    /// Returns the blocks with an edge out of `block`.
    fn successors(&self, block: Self::Block) -> impl Iterator<Item = Self::Block> + '_;

    /// Returns the block containing `inst`.
    fn block_of(&self, inst: Self::Inst) -> Self::Block;

    /// Returns the values read by `inst`.
    fn operands(&self, inst: Self::Inst) -> impl Iterator<Item = Self::Value> + '_;

    /// Returns the value defined by `inst`, if it defines one.
    fn defined_value(&self, inst: Self::Inst) -> Option<Self::Value>;

    /// Returns the formal arguments of the function.
    fn arguments(&self) -> impl Iterator<Item = Self::Value> + '_;

    /// Returns `true` if `value` has a single definition point (an argument or an instruction
    /// result) and can therefore be tracked by an analysis.
    fn is_trackable(&self, value: Self::Value) -> bool;

    /// Returns `true` if `inst` is a control flow merge selecting a value per incoming edge.
    fn is_merge(&self, inst: Self::Inst) -> bool;

    /// Returns the `(predecessor, value)` pairs of a merge instruction; empty for other
    /// instructions.
    fn incoming(&self, inst: Self::Inst) -> impl Iterator<Item = (Self::Block, Self::Value)> + '_;

    /// Returns a printable name for `value`.
    fn value_name(&self, value: Self::Value) -> String;

    /// Returns a printable rendering of `inst`.
    fn render_instruction(&self, inst: Self::Inst) -> String;

    /// Returns the total number of instructions across all blocks.
    fn instruction_count(&self) -> usize {
        self.blocks()
            .map(|block| self.instructions(block).count())
            .sum()
    }
}

//! Traversal direction of an analysis.
//!
//! The direction is a type parameter of the analysis, not a runtime flag. [`Forward`] and
//! [`Backward`] are the only two [`DirectionStrategy`] implementations and the trait is sealed,
//! so an analysis is bound to exactly one set of traversal rules when it is written. The solver
//! asks the strategy for everything direction dependent:
//!
//! | question                          | [`Forward`]                      | [`Backward`]              |
//! |-----------------------------------|----------------------------------|---------------------------|
//! | block order                       | program order                    | reverse program order     |
//! | instruction order in a block      | program order                    | reverse program order     |
//! | neighbours feeding the meet       | predecessors                     | successors                |
//! | fact a block exports to neighbours| last instruction                 | first instruction         |
//! | blocks using the boundary fact    | entry block, blocks with no preds| blocks with no successors |

use strum::Display;

use crate::analysis::ProgramGraph;

/// Runtime tag of a [`DirectionStrategy`], for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Direction {
    /// Information flows from the entry towards the exits.
    ///
    /// Examples: reaching definitions, available expressions.
    Forward,
    /// Information flows from the exits towards the entry.
    ///
    /// Examples: live variables, very busy expressions.
    Backward,
}

mod private {
    pub trait Sealed {}

    impl Sealed for super::Forward {}
    impl Sealed for super::Backward {}
}

/// Direction dependent traversal rules.
///
/// This trait is sealed; use [`Forward`] or [`Backward`].
pub trait DirectionStrategy: private::Sealed + Send + Sync + 'static {
    /// The tag of this strategy.
    const DIRECTION: Direction;

    /// Blocks in the order a sweep visits them.
    fn block_order<G: ProgramGraph>(graph: &G) -> impl Iterator<Item = G::Block> + '_;

    /// Instructions of `block` in the order facts are threaded through them.
    fn instruction_order<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Inst> + '_;

    /// Blocks whose exported facts are combined into the entry fact of `block`.
    fn meet_neighbors<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Block> + '_;

    /// Returns `true` if the entry fact of `block` is the boundary condition rather than a meet.
    fn uses_boundary<G: ProgramGraph>(graph: &G, block: G::Block) -> bool;

    /// The instruction whose fact `block` exports to the blocks it feeds: the last one in
    /// traversal order.
    fn exit_instruction<G: ProgramGraph>(graph: &G, block: G::Block) -> Option<G::Inst> {
        Self::instruction_order(graph, block).last()
    }
}

/// Entry-to-exit traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Forward;

/// Exit-to-entry traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backward;

impl DirectionStrategy for Forward {
    const DIRECTION: Direction = Direction::Forward;

    fn block_order<G: ProgramGraph>(graph: &G) -> impl Iterator<Item = G::Block> + '_ {
        graph.blocks()
    }

    fn instruction_order<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Inst> + '_ {
        graph.instructions(block)
    }

    fn meet_neighbors<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Block> + '_ {
        graph.predecessors(block)
    }

    fn uses_boundary<G: ProgramGraph>(graph: &G, block: G::Block) -> bool {
        graph.entry_block() == Some(block) || graph.predecessors(block).next().is_none()
    }

    fn exit_instruction<G: ProgramGraph>(graph: &G, block: G::Block) -> Option<G::Inst> {
        graph.instructions(block).next_back()
    }
}

impl DirectionStrategy for Backward {
    const DIRECTION: Direction = Direction::Backward;

    fn block_order<G: ProgramGraph>(graph: &G) -> impl Iterator<Item = G::Block> + '_ {
        graph.blocks().rev()
    }

    fn instruction_order<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Inst> + '_ {
        graph.instructions(block).rev()
    }

    fn meet_neighbors<G: ProgramGraph>(
        graph: &G,
        block: G::Block,
    ) -> impl Iterator<Item = G::Block> + '_ {
        graph.successors(block)
    }

    fn uses_boundary<G: ProgramGraph>(graph: &G, block: G::Block) -> bool {
        graph.successors(block).next().is_none()
    }

    fn exit_instruction<G: ProgramGraph>(graph: &G, block: G::Block) -> Option<G::Inst> {
        graph.instructions(block).next()
    }
}

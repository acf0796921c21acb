//! Program analysis infrastructure.
//!
//! This module provides the analysis side of the crate. It is written against the abstract
//! [`ProgramGraph`] trait rather than a concrete IR, so any representation with blocks,
//! instructions, CFG edges and def/use information can be analyzed.
//!
//! # Architecture
//!
//! - [`ProgramGraph`] - the read-only view of one function the analyses consume
//! - [`dataflow`] - the monotone data flow engine and the analyses built on it
//!
//! # Usage
//!
//! ```rust
//! use flowscope::{
//!     analysis::{DataFlowSolver, ReachingDefinitions},
//!     ir::FunctionBuilder,
//! };
//!
//! let mut b = FunctionBuilder::new("id");
//! let x = b.add_argument();
//! let entry = b.create_block();
//! let ret = b.ret(entry, Some(x))?;
//! let func = b.build()?;
//!
//! let results = DataFlowSolver::new(ReachingDefinitions, &func).try_solve()?;
//! assert!(results.holds(ret, &x));
//! # Ok::<(), flowscope::Error>(())
//! ```

pub mod dataflow;
mod graph;

// Re-export primary types at module level
pub use dataflow::{
    analyze_all, intersection_of, union_of, AnalysisContext, AnalysisResults, Backward,
    DataFlowAnalysis, DataFlowSolver, Direction, DirectionStrategy, Domain, DomainBuilder,
    DomainElement, EntryFact, Fact, FactStore, Forward, LiveVariables, NeighborFact,
    ReachingDefinitions, SolverConfig, SolverState, SolverStats,
};
pub use graph::ProgramGraph;

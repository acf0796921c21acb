//! # flowscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the flowscope library. Import this module to get quick access to the essential
//! types for building program graphs and running data flow analyses.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all flowscope operations
pub use crate::Error;

/// The result type used throughout flowscope
pub use crate::Result;

// ================================================================================================
// Program Representation
// ================================================================================================

/// Functions and their construction
pub use crate::ir::{Function, FunctionBuilder};

/// Handles and building blocks of the IR
pub use crate::ir::{
    BinaryOp, Block, BlockId, ComparePredicate, InstId, Instruction, Opcode, ValueId, ValueKind,
};

/// The abstract view analyses consume
pub use crate::analysis::ProgramGraph;

// ================================================================================================
// Data Flow Engine
// ================================================================================================

/// Solver, configuration and results
pub use crate::analysis::{
    analyze_all, AnalysisResults, DataFlowSolver, EntryFact, SolverConfig, SolverState,
    SolverStats,
};

/// Building blocks for writing analyses
pub use crate::analysis::{
    union_of, AnalysisContext, Backward, DataFlowAnalysis, Direction, Domain, DomainBuilder, Fact,
    Forward, NeighborFact,
};

// ================================================================================================
// Analyses
// ================================================================================================

/// Built-in analyses
pub use crate::analysis::{LiveVariables, ReachingDefinitions};

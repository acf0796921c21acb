//! Monotone data flow analysis over bit-vector facts.
//!
//! This module provides a generic engine for computing properties that propagate along control
//! flow edges, with a fact attached to every instruction. It supports both forward and backward
//! analyses; the direction is part of the analysis type.
//!
//! # Architecture
//!
//! The framework is built around five core abstractions:
//!
//! - **Domain** ([`Domain`], [`DomainBuilder`]): the finite set of tracked elements, collected
//!   once per run and then frozen, with a dense index per element
//! - **Fact** ([`Fact`], [`FactStore`]): a bit set over the domain, one per instruction
//! - **Direction** ([`Forward`], [`Backward`]): block order, instruction order and meet neighbours
//! - **Analysis** ([`DataFlowAnalysis`]): initial and boundary conditions, meet and transfer
//! - **Solver** ([`DataFlowSolver`]): sweeps until no fact changes
//!
//! # Analyses Provided
//!
//! - [`LiveVariables`]: which values may still be used, with per-edge handling of merges
//! - [`ReachingDefinitions`]: which definitions may reach each program point
//!
//! # Example
//!
//! ```rust
//! use flowscope::{
//!     analysis::{DataFlowSolver, LiveVariables},
//!     ir::{BinaryOp, FunctionBuilder},
//! };
//!
//! let mut b = FunctionBuilder::new("square");
//! let x = b.add_argument();
//! let entry = b.create_block();
//! let sq = b.binary(entry, BinaryOp::Mul, x, x)?;
//! b.ret(entry, Some(sq))?;
//! let func = b.build()?;
//!
//! let results = DataFlowSolver::new(LiveVariables, &func).try_solve()?;
//! print!("{}", results.dump(&func));
//! # Ok::<(), flowscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A run is single threaded and owns its domain and fact store. Independent runs can proceed in
//! parallel, see [`analyze_all`].

mod batch;
mod config;
mod direction;
mod domain;
mod fact;
mod framework;
mod liveness;
mod reaching;
mod results;
mod solver;

// Re-export primary types
pub use batch::analyze_all;
pub use config::SolverConfig;
pub use direction::{Backward, Direction, DirectionStrategy, Forward};
pub use domain::{Domain, DomainBuilder, DomainElement};
pub use fact::{intersection_of, union_of, Fact, FactIter, FactStore};
pub use framework::{AnalysisContext, DataFlowAnalysis, NeighborFact};
pub use liveness::LiveVariables;
pub use reaching::ReachingDefinitions;
pub use results::{AnalysisResults, EntryFact, SolverStats};
pub use solver::{DataFlowSolver, SolverState};

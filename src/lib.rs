// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]

//! # flowscope
//!
//! A generic, direction-parameterized engine for monotone data flow analysis over SSA-style
//! program graphs, with per-instruction bit-vector facts.
//!
//! ## Features
//!
//! - **Dense facts** - every fact is a word-packed bit set over a per-run domain
//! - **Both directions** - forward and backward analyses share one solver; the direction is
//!   part of the analysis type
//! - **Merge-aware** - backward analyses can treat merge operands as uses on their edge
//! - **Reproducible** - domain numbering and sweep order depend only on the graph
//! - **Batch runs** - analyze many functions in parallel, each run fully isolated
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use flowscope::prelude::*;
//!
//! let mut b = FunctionBuilder::new("sum");
//! let x = b.add_argument();
//! let y = b.add_argument();
//! let entry = b.create_block();
//! let sum = b.binary(entry, BinaryOp::Add, x, y)?;
//! let ret = b.ret(entry, Some(sum))?;
//! let func = b.build()?;
//!
//! let live = DataFlowSolver::new(LiveVariables, &func).try_solve()?;
//! assert_eq!(live.elements_of(ret), vec![&sum]);
//! # Ok::<(), flowscope::Error>(())
//! ```
//!
//! ### Writing an Analysis
//!
//! Implement [`analysis::DataFlowAnalysis`] for any [`analysis::ProgramGraph`]: pick the element
//! type and direction, report elements per instruction, and supply the initial condition, the
//! boundary condition, the meet and the transfer function. [`analysis::LiveVariables`] and
//! [`analysis::ReachingDefinitions`] are complete examples of a backward and a forward analysis.
//!
//! ## Architecture
//!
//! - [`ir`] - a compact SSA representation implementing [`analysis::ProgramGraph`]
//! - [`analysis`] - the graph abstraction, the solver and the analyses
//! - [`Error`] and [`Result`] - error handling for malformed graphs and sweep limits
//!
//! ## Logging
//!
//! The solver reports run start and convergence at `debug` level and every sweep and fact change
//! at `trace` level through the [`log`](https://docs.rs/log) facade. No logger is installed by
//! this crate.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench solver
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the flowscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use flowscope::prelude::*;
///
/// let mut b = FunctionBuilder::new("unit");
/// let entry = b.create_block();
/// b.ret(entry, None)?;
/// let func = b.build()?;
///
/// let results = DataFlowSolver::new(ReachingDefinitions, &func).try_solve()?;
/// assert!(results.domain().is_empty());
/// # Ok::<(), flowscope::Error>(())
/// ```
pub mod prelude;

/// Program analysis: the [`ProgramGraph`](analysis::ProgramGraph) abstraction and the data
/// flow engine.
///
/// # Key Types
///
/// - [`analysis::DataFlowSolver`] - drives an analysis to its fixpoint
/// - [`analysis::DataFlowAnalysis`] - the trait every analysis implements
/// - [`analysis::AnalysisResults`] - per-instruction facts, entry facts, statistics and dumps
/// - [`analysis::SolverConfig`] - sweep limits, fixpoint verification and graph validation
pub mod analysis;

/// A compact SSA program representation.
///
/// Functions are built with [`ir::FunctionBuilder`], which validates block structure, terminators
/// and phi placement. [`ir::Function`] implements [`analysis::ProgramGraph`].
pub mod ir;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use flowscope::{ir::{Function, FunctionBuilder}, Result};
///
/// fn empty_function(name: &str) -> Result<Function> {
///     let mut b = FunctionBuilder::new(name);
///     let entry = b.create_block();
///     b.ret(entry, None)?;
///     b.build()
/// }
/// # empty_function("f").unwrap();
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `flowscope` Error type
///
/// The main error type for all operations in this crate. Reports malformed program graphs,
/// builder misuse and exceeded sweep limits.
///
/// # Examples
///
/// ```rust
/// use flowscope::{analysis::{DataFlowSolver, LiveVariables, SolverConfig}, ir::FunctionBuilder, Error};
///
/// let mut b = FunctionBuilder::new("f");
/// let entry = b.create_block();
/// b.ret(entry, None)?;
/// let func = b.build()?;
///
/// let mut config = SolverConfig::new();
/// config.set_max_sweeps(Some(0));
///
/// match DataFlowSolver::with_config(LiveVariables, &func, config).try_solve() {
///     Ok(_) => println!("converged"),
///     Err(Error::NonConvergence { sweeps }) => println!("gave up after {sweeps} sweeps"),
///     Err(e) => println!("Error: {}", e),
/// }
/// # Ok::<(), flowscope::Error>(())
/// ```
pub use error::Error;

//! A compact SSA program representation.
//!
//! This module provides the concrete program graph the data flow engine runs on: functions made
//! of basic blocks, blocks made of instructions, instructions with explicit operands (uses) and
//! results (defs), and phi instructions as control flow merges.
//!
//! # Architecture
//!
//! - [`Function`]: owns flat tables of values, instructions and blocks, plus the CFG edges
//! - [`Block`]: an ordered list of instruction handles ending in a terminator
//! - [`Instruction`] / [`Opcode`]: one operation in `result = op(operands)` form
//! - [`ValueId`] / [`ValueKind`]: arguments, instruction results and constants
//! - [`FunctionBuilder`]: the only way to construct a [`Function`]; validates structure
//!
//! All handles ([`ValueId`], [`InstId`], [`BlockId`]) are dense indices assigned in creation
//! order, so they are stable for the lifetime of the function and cheap to hash.
//!
//! [`Function`] implements [`ProgramGraph`](crate::analysis::ProgramGraph), which is the only
//! view the analyses have of it.
//!
//! # Thread Safety
//!
//! All types in this module are `Send` and `Sync`.

mod block;
mod builder;
mod function;
mod graph;
mod instruction;
mod value;

pub use block::{Block, BlockId};
pub use builder::FunctionBuilder;
pub use function::{Function, InstructionDisplay};
pub use instruction::{BinaryOp, ComparePredicate, InstId, Instruction, Opcode};
pub use value::{ValueData, ValueId, ValueKind};

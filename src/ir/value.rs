//! Values of the SSA representation.
//!
//! Every value in a [`Function`](crate::ir::Function) is identified by a dense [`ValueId`]
//! assigned by the [`FunctionBuilder`](crate::ir::FunctionBuilder). A value is either a function
//! argument, the result of exactly one instruction, or an integer constant.
//!
//! Only arguments and instruction results are *trackable*: they have a single definition point
//! and can therefore become elements of a data flow domain. Constants are materialized inline
//! and carry no liveness.

use std::fmt;

use crate::ir::InstId;

/// A strongly-typed identifier for a value within a function.
///
/// `ValueId` is a stable handle: analyses hash and compare it instead of relying on the address
/// of the value's storage.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(usize);

impl ValueId {
    /// Creates a new value identifier from a raw index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into the value table of the owning function
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

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Where a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The n-th formal argument of the function.
    Argument(usize),
    /// The result of an instruction.
    Result(InstId),
    /// An integer constant.
    Constant(i64),
}

impl ValueKind {
    /// Returns `true` for arguments and instruction results.
    #[must_use]
    pub const fn is_trackable(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::Result(_))
    }

    /// Returns the defining instruction, if this value is an instruction result.
    #[must_use]
    pub const fn defining_instruction(&self) -> Option<InstId> {
        match self {
            Self::Result(inst) => Some(*inst),
            _ => None,
        }
    }
}

/// Per-value bookkeeping stored in the function's value table.
#[derive(Debug, Clone)]
pub struct ValueData {
    kind: ValueKind,
    name: Option<String>,
}

impl ValueData {
    pub(crate) fn new(kind: ValueKind) -> Self {
        Self { kind, name: None }
    }

    /// Returns how this value is defined.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the user-assigned name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

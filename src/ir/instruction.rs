//! Instructions with explicit def/use information.
//!
//! Each [`Instruction`] carries an [`Opcode`] in `result = op(operands)` form plus the
//! [`ValueId`] it defines, if any. Operands and successors are derived from the opcode so that
//! the def/use view seen by analyses can never drift from the operation itself.
//!
//! Control flow merges are modelled as [`Opcode::Phi`]: a phi selects one incoming value per
//! predecessor block and must appear before any ordinary instruction of its block.

use std::fmt;

use strum::Display;

use crate::ir::{BlockId, ValueId};

/// A strongly-typed identifier for an instruction within a function.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstId(usize);

impl InstId {
    /// Creates a new instruction identifier from a raw index.
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

impl fmt::Debug for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Two-operand arithmetic and bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BinaryOp {
    /// Wrapping addition
    Add,
    /// Wrapping subtraction
    Sub,
    /// Wrapping multiplication
    Mul,
    /// Signed division
    Div,
    /// Signed remainder
    Rem,
    /// Bitwise and
    And,
    /// Bitwise or
    Or,
    /// Bitwise exclusive or
    Xor,
    /// Shift left
    Shl,
    /// Arithmetic shift right
    Shr,
}

/// Predicates of the integer comparison instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ComparePredicate {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Signed less than
    Lt,
    /// Signed less than or equal
    Le,
    /// Signed greater than
    Gt,
    /// Signed greater than or equal
    Ge,
}

/// An operation in `result = op(operands)` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// `result = lhs <op> rhs`
    Binary {
        /// The arithmetic or bitwise operation
        op: BinaryOp,
        /// Left operand
        lhs: ValueId,
        /// Right operand
        rhs: ValueId,
    },
    /// `result = icmp <pred> lhs, rhs`
    Compare {
        /// The comparison predicate
        pred: ComparePredicate,
        /// Left operand
        lhs: ValueId,
        /// Right operand
        rhs: ValueId,
    },
    /// `result = source`
    Copy(ValueId),
    /// `result = load addr`
    Load {
        /// Address operand
        addr: ValueId,
    },
    /// `store value, addr`
    Store {
        /// Address operand
        addr: ValueId,
        /// Stored value
        value: ValueId,
    },
    /// `[result =] call callee(args)`
    Call {
        /// Name of the called function
        callee: String,
        /// Call arguments
        args: Vec<ValueId>,
        /// Whether the call produces a result
        returns: bool,
    },
    /// `result = phi [value, block], ...`
    Phi {
        /// One `(predecessor, value)` pair per incoming edge
        incoming: Vec<(BlockId, ValueId)>,
    },
    /// `br target`
    Br {
        /// Branch destination
        target: BlockId,
    },
    /// `br cond, then_dest, else_dest`
    CondBr {
        /// Branch condition
        cond: ValueId,
        /// Destination when the condition is non-zero
        then_dest: BlockId,
        /// Destination when the condition is zero
        else_dest: BlockId,
    },
    /// `ret [value]`
    Ret {
        /// Returned value, if any
        value: Option<ValueId>,
    },
}

impl Opcode {
    /// Returns the values read by this operation, in operand order.
    ///
    /// For a phi these are the incoming values, one per incoming edge.
    #[must_use]
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Copy(source) => vec![*source],
            Self::Load { addr } => vec![*addr],
            Self::Store { addr, value } => vec![*value, *addr],
            Self::Call { args, .. } => args.clone(),
            Self::Phi { incoming } => incoming.iter().map(|(_, value)| *value).collect(),
            Self::Br { .. } => Vec::new(),
            Self::CondBr { cond, .. } => vec![*cond],
            Self::Ret { value } => value.iter().copied().collect(),
        }
    }

    /// Returns the blocks control may transfer to after this operation.
    ///
    /// A conditional branch whose destinations coincide contributes a single edge.
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Br { target } => vec![*target],
            Self::CondBr {
                then_dest,
                else_dest,
                ..
            } if then_dest == else_dest => vec![*then_dest],
            Self::CondBr {
                then_dest,
                else_dest,
                ..
            } => vec![*then_dest, *else_dest],
            _ => Vec::new(),
        }
    }

    /// Returns `true` if this operation ends a basic block.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Self::Br { .. } | Self::CondBr { .. } | Self::Ret { .. })
    }

    /// Returns `true` if this operation is a control flow merge.
    #[must_use]
    pub const fn is_phi(&self) -> bool {
        matches!(self, Self::Phi { .. })
    }

    /// Returns `true` if this operation produces a result value.
    #[must_use]
    pub const fn defines_value(&self) -> bool {
        match self {
            Self::Binary { .. }
            | Self::Compare { .. }
            | Self::Copy(_)
            | Self::Load { .. }
            | Self::Phi { .. } => true,
            Self::Call { returns, .. } => *returns,
            Self::Store { .. } | Self::Br { .. } | Self::CondBr { .. } | Self::Ret { .. } => false,
        }
    }

    /// Returns the textual mnemonic of this operation.
    #[must_use]
    pub fn mnemonic(&self) -> String {
        match self {
            Self::Binary { op, .. } => op.to_string(),
            Self::Compare { pred, .. } => format!("icmp {pred}"),
            Self::Copy(_) => "copy".to_string(),
            Self::Load { .. } => "load".to_string(),
            Self::Store { .. } => "store".to_string(),
            Self::Call { .. } => "call".to_string(),
            Self::Phi { .. } => "phi".to_string(),
            Self::Br { .. } | Self::CondBr { .. } => "br".to_string(),
            Self::Ret { .. } => "ret".to_string(),
        }
    }
}

/// An instruction placed in a basic block.
#[derive(Debug, Clone)]
pub struct Instruction {
    id: InstId,
    block: BlockId,
    opcode: Opcode,
    result: Option<ValueId>,
}

impl Instruction {
    pub(crate) fn new(id: InstId, block: BlockId, opcode: Opcode, result: Option<ValueId>) -> Self {
        Self {
            id,
            block,
            opcode,
            result,
        }
    }

    /// Returns the identifier of this instruction.
    #[must_use]
    pub const fn id(&self) -> InstId {
        self.id
    }

    /// Returns the block containing this instruction.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Returns the operation performed by this instruction.
    #[must_use]
    pub const fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    /// Returns the value defined by this instruction, if any.
    #[must_use]
    pub const fn result(&self) -> Option<ValueId> {
        self.result
    }

    /// Returns the values read by this instruction.
    #[must_use]
    pub fn operands(&self) -> Vec<ValueId> {
        self.opcode.operands()
    }

    /// Returns the `(predecessor, value)` pairs of a phi, or an empty slice otherwise.
    #[must_use]
    pub fn incoming(&self) -> &[(BlockId, ValueId)] {
        match &self.opcode {
            Opcode::Phi { incoming } => incoming,
            _ => &[],
        }
    }

    /// Appends an incoming pair to a phi. Returns `false` if this is not a phi.
    pub(crate) fn push_incoming(&mut self, pred: BlockId, value: ValueId) -> bool {
        match &mut self.opcode {
            Opcode::Phi { incoming } => {
                incoming.push((pred, value));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operands_follow_opcode() {
        let add = Opcode::Binary {
            op: BinaryOp::Add,
            lhs: ValueId::new(0),
            rhs: ValueId::new(1),
        };
        assert_eq!(add.operands(), vec![ValueId::new(0), ValueId::new(1)]);
        assert!(add.defines_value());
        assert!(!add.is_terminator());

        let ret = Opcode::Ret { value: None };
        assert!(ret.operands().is_empty());
        assert!(ret.is_terminator());
        assert!(!ret.defines_value());
    }

    #[test]
    fn test_phi_operands_are_incoming_values() {
        let phi = Opcode::Phi {
            incoming: vec![
                (BlockId::new(1), ValueId::new(4)),
                (BlockId::new(2), ValueId::new(5)),
            ],
        };
        assert!(phi.is_phi());
        assert_eq!(phi.operands(), vec![ValueId::new(4), ValueId::new(5)]);
    }

    #[test]
    fn test_cond_br_collapses_identical_targets() {
        let split = Opcode::CondBr {
            cond: ValueId::new(0),
            then_dest: BlockId::new(1),
            else_dest: BlockId::new(2),
        };
        assert_eq!(split.successors(), vec![BlockId::new(1), BlockId::new(2)]);

        let same = Opcode::CondBr {
            cond: ValueId::new(0),
            then_dest: BlockId::new(1),
            else_dest: BlockId::new(1),
        };
        assert_eq!(same.successors(), vec![BlockId::new(1)]);
    }

    #[test]
    fn test_mnemonics() {
        let cmp = Opcode::Compare {
            pred: ComparePredicate::Lt,
            lhs: ValueId::new(0),
            rhs: ValueId::new(1),
        };
        assert_eq!(cmp.mnemonic(), "icmp lt");
        assert_eq!(
            Opcode::Binary {
                op: BinaryOp::Shr,
                lhs: ValueId::new(0),
                rhs: ValueId::new(1),
            }
            .mnemonic(),
            "shr"
        );
    }
}

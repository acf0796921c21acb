//! Functions: the unit of data flow analysis.
//!
//! A [`Function`] owns its values, instructions and blocks in flat tables indexed by
//! [`ValueId`], [`InstId`] and [`BlockId`]. Blocks are kept in program order, the first block
//! being the entry. Predecessor and successor lists are computed once by the builder from the
//! block terminators and are immutable afterwards.
//!
//! Functions are only constructed through [`FunctionBuilder`](crate::ir::FunctionBuilder), which
//! validates the structural invariants the analyses rely on.

use std::fmt;

use crate::ir::{Block, BlockId, InstId, Instruction, Opcode, ValueData, ValueId, ValueKind};

/// A function in SSA form.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    arguments: Vec<ValueId>,
    values: Vec<ValueData>,
    instructions: Vec<Instruction>,
    blocks: Vec<Block>,
    predecessors: Vec<Vec<BlockId>>,
    successors: Vec<Vec<BlockId>>,
}

impl Function {
    pub(crate) fn from_parts(
        name: String,
        arguments: Vec<ValueId>,
        values: Vec<ValueData>,
        instructions: Vec<Instruction>,
        blocks: Vec<Block>,
        predecessors: Vec<Vec<BlockId>>,
        successors: Vec<Vec<BlockId>>,
    ) -> Self {
        Self {
            name,
            arguments,
            values,
            instructions,
            blocks,
            predecessors,
            successors,
        }
    }

    /// Returns the name of the function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formal arguments in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &[ValueId] {
        &self.arguments
    }

    /// Returns all blocks in program order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the entry block, or `None` for a function without blocks.
    #[must_use]
    pub fn entry(&self) -> Option<BlockId> {
        self.blocks.first().map(Block::id)
    }

    /// Returns the block with the given identifier.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// Returns the instruction with the given identifier.
    #[must_use]
    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.instructions.get(id.index())
    }

    /// Returns the bookkeeping data of a value.
    #[must_use]
    pub fn value(&self, id: ValueId) -> Option<&ValueData> {
        self.values.get(id.index())
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the number of instructions across all blocks.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Returns the number of values, including constants.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Returns the predecessors of a block.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not belong to this function.
    #[must_use]
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        &self.predecessors[block.index()]
    }

    /// Returns the successors of a block, in terminator operand order.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not belong to this function.
    #[must_use]
    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        &self.successors[block.index()]
    }

    /// Returns the value produced by an instruction, if any.
    #[must_use]
    pub fn result_of(&self, inst: InstId) -> Option<ValueId> {
        self.instruction(inst).and_then(Instruction::result)
    }

    /// Returns the textual name of a value: `%name` if one was assigned, `%argN` for arguments,
    /// `%vN` for instruction results and the literal for constants.
    #[must_use]
    pub fn value_name(&self, value: ValueId) -> String {
        let Some(data) = self.value(value) else {
            return format!("%<invalid {value}>");
        };
        if let Some(name) = data.name() {
            return format!("%{name}");
        }
        match data.kind() {
            ValueKind::Argument(n) => format!("%arg{n}"),
            ValueKind::Result(_) => format!("%{value}"),
            ValueKind::Constant(c) => c.to_string(),
        }
    }

    /// Returns the textual label of a block: `%name` if one was assigned, `%bbN` otherwise.
    #[must_use]
    pub fn block_label(&self, block: BlockId) -> String {
        match self.block(block).and_then(Block::name) {
            Some(name) => format!("%{name}"),
            None => format!("%{block}"),
        }
    }

    /// Returns a displayable view of one instruction.
    #[must_use]
    pub fn display_instruction(&self, inst: InstId) -> InstructionDisplay<'_> {
        InstructionDisplay { func: self, inst }
    }
}

/// Renders a single instruction in a compact LLVM-like syntax.
pub struct InstructionDisplay<'a> {
    func: &'a Function,
    inst: InstId,
}

impl InstructionDisplay<'_> {
    fn join(&self, values: &[ValueId]) -> String {
        values
            .iter()
            .map(|v| self.func.value_name(*v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for InstructionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(instr) = self.func.instruction(self.inst) else {
            return write!(f, "<invalid {:?}>", self.inst);
        };
        let func = self.func;

        if let Some(result) = instr.result() {
            write!(f, "{} = ", func.value_name(result))?;
        }

        let op = instr.opcode();
        match op {
            Opcode::Binary { lhs, rhs, .. } | Opcode::Compare { lhs, rhs, .. } => {
                write!(f, "{} {}", op.mnemonic(), self.join(&[*lhs, *rhs]))
            }
            Opcode::Copy(source) => write!(f, "copy {}", func.value_name(*source)),
            Opcode::Load { addr } => write!(f, "load {}", func.value_name(*addr)),
            Opcode::Store { addr, value } => write!(f, "store {}", self.join(&[*value, *addr])),
            Opcode::Call { callee, args, .. } => write!(f, "call @{callee}({})", self.join(args)),
            Opcode::Phi { incoming } => {
                write!(f, "phi ")?;
                for (i, (block, value)) in incoming.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "[ {}, {} ]",
                        func.value_name(*value),
                        func.block_label(*block)
                    )?;
                }
                Ok(())
            }
            Opcode::Br { target } => write!(f, "br {}", func.block_label(*target)),
            Opcode::CondBr {
                cond,
                then_dest,
                else_dest,
            } => write!(
                f,
                "br {}, {}, {}",
                func.value_name(*cond),
                func.block_label(*then_dest),
                func.block_label(*else_dest)
            ),
            Opcode::Ret { value: Some(value) } => write!(f, "ret {}", func.value_name(*value)),
            Opcode::Ret { value: None } => write!(f, "ret void"),
        }
    }
}

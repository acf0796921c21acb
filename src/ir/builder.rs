//! Incremental construction of [`Function`]s.
//!
//! The builder appends instructions to explicitly named blocks, so blocks can be filled in any
//! order (a loop latch before its header, for instance). Structural checks that can be made
//! eagerly happen on every append; whole-function checks happen in [`FunctionBuilder::build`].
//!
//! # Example
//!
//! ```rust
//! use flowscope::ir::{BinaryOp, FunctionBuilder};
//!
//! let mut b = FunctionBuilder::new("double");
//! let x = b.add_argument();
//! let entry = b.create_block();
//! let twice = b.binary(entry, BinaryOp::Add, x, x)?;
//! b.ret(entry, Some(twice))?;
//!
//! let func = b.build()?;
//! assert_eq!(func.instruction_count(), 2);
//! # Ok::<(), flowscope::Error>(())
//! ```

use std::collections::HashSet;

use crate::{
    ir::{
        BinaryOp, Block, BlockId, ComparePredicate, Function, InstId, Instruction, Opcode,
        ValueData, ValueId, ValueKind,
    },
    Error, Result,
};

/// Builder for a single [`Function`].
#[derive(Debug, Default)]
pub struct FunctionBuilder {
    name: String,
    arguments: Vec<ValueId>,
    values: Vec<ValueData>,
    instructions: Vec<Instruction>,
    blocks: Vec<Block>,
}

impl FunctionBuilder {
    /// Creates a builder for a function with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a formal argument and returns its value.
    pub fn add_argument(&mut self) -> ValueId {
        let id = self.new_value(ValueKind::Argument(self.arguments.len()));
        self.arguments.push(id);
        id
    }

    /// Creates an integer constant value.
    pub fn constant(&mut self, value: i64) -> ValueId {
        self.new_value(ValueKind::Constant(value))
    }

    /// Appends a new, empty block. The first block created is the entry block.
    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push(Block::new(id, None));
        id
    }

    /// Appends a new, empty block with a label used when printing.
    pub fn create_named_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push(Block::new(id, Some(name.into())));
        id
    }

    /// Assigns a printable name to a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownValue`] if `value` was not created by this builder.
    pub fn set_value_name(&mut self, value: ValueId, name: impl Into<String>) -> Result<()> {
        let data = self
            .values
            .get_mut(value.index())
            .ok_or(Error::UnknownValue(value.index()))?;
        data.set_name(name.into());
        Ok(())
    }

    /// Appends `result = lhs <op> rhs`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn binary(
        &mut self,
        block: BlockId,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<ValueId> {
        self.push_value(block, Opcode::Binary { op, lhs, rhs })
    }

    /// Appends `result = icmp <pred> lhs, rhs`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn compare(
        &mut self,
        block: BlockId,
        pred: ComparePredicate,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<ValueId> {
        self.push_value(block, Opcode::Compare { pred, lhs, rhs })
    }

    /// Appends `result = copy source`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn copy(&mut self, block: BlockId, source: ValueId) -> Result<ValueId> {
        self.push_value(block, Opcode::Copy(source))
    }

    /// Appends `result = load addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn load(&mut self, block: BlockId, addr: ValueId) -> Result<ValueId> {
        self.push_value(block, Opcode::Load { addr })
    }

    /// Appends `store value, addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn store(&mut self, block: BlockId, value: ValueId, addr: ValueId) -> Result<InstId> {
        self.push(block, Opcode::Store { addr, value })
            .map(|(inst, _)| inst)
    }

    /// Appends `result = call callee(args)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn call(
        &mut self,
        block: BlockId,
        callee: impl Into<String>,
        args: &[ValueId],
    ) -> Result<ValueId> {
        self.push_value(
            block,
            Opcode::Call {
                callee: callee.into(),
                args: args.to_vec(),
                returns: true,
            },
        )
    }

    /// Appends `call callee(args)` for a callee without a result.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn call_void(
        &mut self,
        block: BlockId,
        callee: impl Into<String>,
        args: &[ValueId],
    ) -> Result<InstId> {
        self.push(
            block,
            Opcode::Call {
                callee: callee.into(),
                args: args.to_vec(),
                returns: false,
            },
        )
        .map(|(inst, _)| inst)
    }

    /// Appends `result = phi [value, pred], ...`.
    ///
    /// Incoming blocks are checked against the final predecessor lists in [`Self::build`], since
    /// the predecessors may not be terminated yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown, or if the block already holds a non-phi
    /// instruction.
    pub fn phi(&mut self, block: BlockId, incoming: &[(BlockId, ValueId)]) -> Result<ValueId> {
        for (pred, _) in incoming {
            self.check_block(*pred)?;
        }
        self.push_value(
            block,
            Opcode::Phi {
                incoming: incoming.to_vec(),
            },
        )
    }

    /// Adds an incoming `(pred, value)` pair to an existing phi.
    ///
    /// Loop headers need this: the value flowing around the back edge is defined after the phi.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or if `phi` is not the result of a phi.
    pub fn add_incoming(&mut self, phi: ValueId, pred: BlockId, value: ValueId) -> Result<()> {
        self.check_block(pred)?;
        self.check_value(value)?;
        self.check_value(phi)?;
        let Some(inst) = self.values[phi.index()].kind().defining_instruction() else {
            return Err(malformed_error!("Value {} is not a phi", phi));
        };
        if self.instructions[inst.index()].push_incoming(pred, value) {
            Ok(())
        } else {
            Err(malformed_error!("Value {} is not a phi", phi))
        }
    }

    /// Appends an unconditional branch.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn br(&mut self, block: BlockId, target: BlockId) -> Result<InstId> {
        self.check_block(target)?;
        self.push(block, Opcode::Br { target }).map(|(inst, _)| inst)
    }

    /// Appends a two-way conditional branch.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn cond_br(
        &mut self,
        block: BlockId,
        cond: ValueId,
        then_dest: BlockId,
        else_dest: BlockId,
    ) -> Result<InstId> {
        self.check_block(then_dest)?;
        self.check_block(else_dest)?;
        self.push(
            block,
            Opcode::CondBr {
                cond,
                then_dest,
                else_dest,
            },
        )
        .map(|(inst, _)| inst)
    }

    /// Appends a return.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the block is already terminated.
    pub fn ret(&mut self, block: BlockId, value: Option<ValueId>) -> Result<InstId> {
        self.push(block, Opcode::Ret { value }).map(|(inst, _)| inst)
    }

    /// Finishes construction and validates the function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if a block is empty or does not end with a terminator, or if
    /// the incoming blocks of a phi differ from the predecessors of its block.
    pub fn build(self) -> Result<Function> {
        let block_count = self.blocks.len();
        let mut predecessors: Vec<Vec<BlockId>> = vec![Vec::new(); block_count];
        let mut successors: Vec<Vec<BlockId>> = vec![Vec::new(); block_count];

        for block in &self.blocks {
            let Some(last) = block.last() else {
                return Err(malformed_error!("Block {} has no instructions", block.id()));
            };
            let terminator = self.instructions[last.index()].opcode();
            if !terminator.is_terminator() {
                return Err(malformed_error!(
                    "Block {} does not end with a terminator",
                    block.id()
                ));
            }

            for succ in terminator.successors() {
                successors[block.id().index()].push(succ);
                predecessors[succ.index()].push(block.id());
            }
        }

        for instr in self.instructions.iter().filter(|i| i.opcode().is_phi()) {
            let preds: HashSet<BlockId> =
                predecessors[instr.block().index()].iter().copied().collect();
            let incoming: HashSet<BlockId> = instr.incoming().iter().map(|(b, _)| *b).collect();
            if incoming.len() != instr.incoming().len() {
                return Err(malformed_error!(
                    "Phi {:?} in {} lists an incoming block twice",
                    instr.id(),
                    instr.block()
                ));
            }
            if preds != incoming {
                return Err(malformed_error!(
                    "Phi {:?} in {} has incoming blocks {:?} but the block has predecessors {:?}",
                    instr.id(),
                    instr.block(),
                    instr.incoming().iter().map(|(b, _)| *b).collect::<Vec<_>>(),
                    predecessors[instr.block().index()]
                ));
            }
        }

        Ok(Function::from_parts(
            self.name,
            self.arguments,
            self.values,
            self.instructions,
            self.blocks,
            predecessors,
            successors,
        ))
    }

    fn new_value(&mut self, kind: ValueKind) -> ValueId {
        let id = ValueId::new(self.values.len());
        self.values.push(ValueData::new(kind));
        id
    }

    fn check_block(&self, block: BlockId) -> Result<()> {
        if block.index() < self.blocks.len() {
            Ok(())
        } else {
            Err(Error::UnknownBlock(block.index()))
        }
    }

    fn check_value(&self, value: ValueId) -> Result<()> {
        if value.index() < self.values.len() {
            Ok(())
        } else {
            Err(Error::UnknownValue(value.index()))
        }
    }

    fn push_value(&mut self, block: BlockId, opcode: Opcode) -> Result<ValueId> {
        let (_, result) = self.push(block, opcode)?;
        result.ok_or_else(|| malformed_error!("Operation does not define a value"))
    }

    fn push(&mut self, block: BlockId, opcode: Opcode) -> Result<(InstId, Option<ValueId>)> {
        self.check_block(block)?;
        for operand in opcode.operands() {
            self.check_value(operand)?;
        }

        let existing = self.blocks[block.index()].instructions();
        if let Some(last) = existing.last() {
            if self.instructions[last.index()].opcode().is_terminator() {
                return Err(malformed_error!("Block {} is already terminated", block));
            }
        }
        if opcode.is_phi()
            && existing
                .iter()
                .any(|i| !self.instructions[i.index()].opcode().is_phi())
        {
            return Err(malformed_error!(
                "Phi must precede all ordinary instructions of {}",
                block
            ));
        }

        let inst = InstId::new(self.instructions.len());
        let result = opcode
            .defines_value()
            .then(|| self.new_value(ValueKind::Result(inst)));
        self.instructions
            .push(Instruction::new(inst, block, opcode, result));
        self.blocks[block.index()].push(inst);

        Ok((inst, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_straight_line() {
        let mut b = FunctionBuilder::new("line");
        let x = b.add_argument();
        let entry = b.create_block();
        let y = b.binary(entry, BinaryOp::Mul, x, x).unwrap();
        b.ret(entry, Some(y)).unwrap();

        let func = b.build().unwrap();
        assert_eq!(func.name(), "line");
        assert_eq!(func.block_count(), 1);
        assert_eq!(func.instruction_count(), 2);
        assert_eq!(func.arguments(), &[x]);
        assert_eq!(
            func.value(y).unwrap().kind(),
            ValueKind::Result(InstId::new(0))
        );
    }

    #[test]
    fn test_build_memory_and_calls() {
        let mut b = FunctionBuilder::new("memory");
        let p = b.add_argument();
        let entry = b.create_block();
        let loaded = b.load(entry, p).unwrap();
        b.set_value_name(loaded, "v").unwrap();
        let stored = b.store(entry, loaded, p).unwrap();
        let r = b.call(entry, "f", &[loaded, p]).unwrap();
        b.set_value_name(r, "r").unwrap();
        let log = b.call_void(entry, "log", &[r]).unwrap();
        b.ret(entry, None).unwrap();

        let func = b.build().unwrap();
        // the argument and the two results; store and void call define nothing
        assert_eq!(func.value_count(), 3);
        assert_eq!(func.result_of(stored), None);
        assert_eq!(func.result_of(log), None);

        let rendered: Vec<String> = func
            .block(entry)
            .unwrap()
            .instructions()
            .iter()
            .map(|i| func.display_instruction(*i).to_string())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "%v = load %arg0",
                "store %v, %arg0",
                "%r = call @f(%v, %arg0)",
                "call @log(%r)",
                "ret void",
            ]
        );
    }

    #[test]
    fn test_reject_missing_terminator() {
        let mut b = FunctionBuilder::new("open");
        let x = b.add_argument();
        let entry = b.create_block();
        b.copy(entry, x).unwrap();

        assert!(matches!(b.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_reject_empty_block() {
        let mut b = FunctionBuilder::new("empty");
        let entry = b.create_block();
        b.create_block();
        b.ret(entry, None).unwrap();

        assert!(matches!(b.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_reject_append_after_terminator() {
        let mut b = FunctionBuilder::new("late");
        let x = b.add_argument();
        let entry = b.create_block();
        b.ret(entry, None).unwrap();

        assert!(matches!(b.copy(entry, x), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_reject_phi_after_instruction() {
        let mut b = FunctionBuilder::new("phi_late");
        let x = b.add_argument();
        let entry = b.create_block();
        let body = b.create_block();
        b.br(entry, body).unwrap();
        b.copy(body, x).unwrap();

        assert!(matches!(
            b.phi(body, &[(entry, x)]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_reject_phi_predecessor_mismatch() {
        let mut b = FunctionBuilder::new("phi_mismatch");
        let x = b.add_argument();
        let entry = b.create_block();
        let other = b.create_block();
        let join = b.create_block();
        b.br(entry, join).unwrap();
        b.ret(other, None).unwrap();
        let merged = b.phi(join, &[(entry, x), (other, x)]).unwrap();
        b.ret(join, Some(merged)).unwrap();

        assert!(matches!(b.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_add_incoming_closes_loop() {
        let mut b = FunctionBuilder::new("loop");
        let x = b.add_argument();
        let entry = b.create_block();
        let header = b.create_block();
        b.br(entry, header).unwrap();
        let i = b.phi(header, &[(entry, x)]).unwrap();
        let next = b.copy(header, i).unwrap();
        b.add_incoming(i, header, next).unwrap();
        b.br(header, header).unwrap();

        assert!(matches!(
            b.add_incoming(next, header, x),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            b.add_incoming(x, header, x),
            Err(Error::Malformed { .. })
        ));

        let func = b.build().unwrap();
        assert_eq!(func.predecessors(header), &[entry, header]);
        let phi = func.block(header).unwrap().instructions()[0];
        assert_eq!(
            func.instruction(phi).unwrap().incoming(),
            &[(entry, x), (header, next)]
        );
    }

    #[test]
    fn test_unknown_handles() {
        let mut b = FunctionBuilder::new("unknown");
        let entry = b.create_block();

        assert!(matches!(
            b.copy(entry, ValueId::new(42)),
            Err(Error::UnknownValue(42))
        ));
        assert!(matches!(
            b.br(entry, BlockId::new(9)),
            Err(Error::UnknownBlock(9))
        ));
        assert!(matches!(
            b.set_value_name(ValueId::new(3), "x"),
            Err(Error::UnknownValue(3))
        ));
    }
}

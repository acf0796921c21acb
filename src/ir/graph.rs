//! [`ProgramGraph`] implementation for [`Function`].

use crate::{
    analysis::ProgramGraph,
    ir::{Block, BlockId, Function, InstId, Instruction, ValueData, ValueId},
};

impl ProgramGraph for Function {
    type Block = BlockId;
    type Inst = InstId;
    type Value = ValueId;

    fn entry_block(&self) -> Option<BlockId> {
        self.entry()
    }

    fn blocks(&self) -> impl DoubleEndedIterator<Item = BlockId> + '_ {
        Function::blocks(self).iter().map(Block::id)
    }

    fn instructions(&self, block: BlockId) -> impl DoubleEndedIterator<Item = InstId> + '_ {
        self.block(block)
            .map(Block::instructions)
            .unwrap_or_default()
            .iter()
            .copied()
    }

    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        Function::predecessors(self, block).iter().copied()
    }

    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        Function::successors(self, block).iter().copied()
    }

    fn block_of(&self, inst: InstId) -> BlockId {
        self.instruction(inst)
            .map(Instruction::block)
            .unwrap_or_else(|| panic!("instruction {inst:?} does not belong to {}", self.name()))
    }

    fn operands(&self, inst: InstId) -> impl Iterator<Item = ValueId> + '_ {
        self.instruction(inst)
            .map(Instruction::operands)
            .unwrap_or_default()
            .into_iter()
    }

    fn defined_value(&self, inst: InstId) -> Option<ValueId> {
        self.result_of(inst)
    }

    fn arguments(&self) -> impl Iterator<Item = ValueId> + '_ {
        Function::arguments(self).iter().copied()
    }

    fn is_trackable(&self, value: ValueId) -> bool {
        self.value(value)
            .map(ValueData::kind)
            .is_some_and(|kind| kind.is_trackable())
    }

    fn is_merge(&self, inst: InstId) -> bool {
        self.instruction(inst)
            .is_some_and(|instr| instr.opcode().is_phi())
    }

    fn incoming(&self, inst: InstId) -> impl Iterator<Item = (BlockId, ValueId)> + '_ {
        self.instruction(inst)
            .map(Instruction::incoming)
            .unwrap_or_default()
            .iter()
            .copied()
    }

    fn value_name(&self, value: ValueId) -> String {
        Function::value_name(self, value)
    }

    fn render_instruction(&self, inst: InstId) -> String {
        self.display_instruction(inst).to_string()
    }

    fn instruction_count(&self) -> usize {
        Function::instruction_count(self)
    }
}

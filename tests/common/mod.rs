//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use flowscope::{
    analysis::ProgramGraph,
    ir::{BinaryOp, BlockId, Function, FunctionBuilder, InstId, ValueId},
    Result,
};
use proptest::prelude::*;

/// Handles into the `entry -> {a, b} -> merge -> exit` liveness scenario.
pub struct Scenario {
    pub func: Function,
    pub entry: BlockId,
    pub a: BlockId,
    pub b: BlockId,
    pub merge: BlockId,
    pub exit: BlockId,
    pub arg: ValueId,
    pub v1: ValueId,
    pub v2: ValueId,
    pub v3: ValueId,
    pub m: ValueId,
    pub phi: InstId,
}

impl Scenario {
    /// The last instruction (terminator) of `block`.
    pub fn last(&self, block: BlockId) -> InstId {
        self.func.block(block).and_then(|b| b.last()).unwrap()
    }
}

/// ```text
/// entry:  %v1 = add %arg0, 1
///         br 1, %a, %b
/// a:      %v2 = mul %v1, 2
///         br %merge
/// b:      %v3 = add 2, 2
///         br %merge
/// merge:  %m = phi [ %v2, %a ], [ %v3, %b ]
///         br %exit
/// exit:   ret %m
/// ```
pub fn scenario() -> Result<Scenario> {
    let mut builder = FunctionBuilder::new("scenario");
    let arg = builder.add_argument();
    let one = builder.constant(1);
    let two = builder.constant(2);

    let entry = builder.create_named_block("entry");
    let a = builder.create_named_block("a");
    let b = builder.create_named_block("b");
    let merge = builder.create_named_block("merge");
    let exit = builder.create_named_block("exit");

    let v1 = builder.binary(entry, BinaryOp::Add, arg, one)?;
    builder.cond_br(entry, one, a, b)?;
    let v2 = builder.binary(a, BinaryOp::Mul, v1, two)?;
    builder.br(a, merge)?;
    let v3 = builder.binary(b, BinaryOp::Add, two, two)?;
    builder.br(b, merge)?;
    let m = builder.phi(merge, &[(a, v2), (b, v3)])?;
    builder.br(merge, exit)?;
    builder.ret(exit, Some(m))?;

    for (value, name) in [(v1, "v1"), (v2, "v2"), (v3, "v3"), (m, "m")] {
        builder.set_value_name(value, name)?;
    }

    let func = builder.build()?;
    let phi = func.block(merge).unwrap().instructions()[0];
    Ok(Scenario {
        func,
        entry,
        a,
        b,
        merge,
        exit,
        arg,
        v1,
        v2,
        v3,
        m,
        phi,
    })
}

/// A chain of `blocks` blocks, each adding the previous value to the argument.
pub fn chain(blocks: usize) -> Result<Function> {
    let mut builder = FunctionBuilder::new("chain");
    let x = builder.add_argument();
    let ids: Vec<BlockId> = (0..blocks).map(|_| builder.create_block()).collect();
    let mut current = x;
    for (i, &block) in ids.iter().enumerate() {
        current = builder.binary(block, BinaryOp::Add, current, x)?;
        match ids.get(i + 1) {
            Some(&next) => builder.br(block, next)?,
            None => builder.ret(block, Some(current))?,
        };
    }
    builder.build()
}

/// How a generated block ends. Indices are reduced modulo the values or blocks available.
#[derive(Debug, Clone)]
pub enum Exit {
    Ret(Option<usize>),
    Br(usize),
    CondBr(usize, usize, usize),
}

/// A generated block: `add` operand indices, then the terminator.
#[derive(Debug, Clone)]
pub struct BlockShape {
    pub ops: Vec<(usize, usize)>,
    pub exit: Exit,
}

/// The skeleton of a generated phi-free function.
#[derive(Debug, Clone)]
pub struct Shape {
    pub args: usize,
    pub blocks: Vec<BlockShape>,
}

/// Arbitrary control flow (loops, unreachable blocks, several exits) over up to eight blocks.
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    (1usize..4, 1usize..9).prop_flat_map(|(args, blocks)| {
        let exit = prop_oneof![
            prop::option::of(any::<usize>()).prop_map(Exit::Ret),
            (0..blocks).prop_map(Exit::Br),
            (any::<usize>(), 0..blocks, 0..blocks).prop_map(|(c, t, e)| Exit::CondBr(c, t, e)),
        ];
        let block = (
            prop::collection::vec((any::<usize>(), any::<usize>()), 0..4),
            exit,
        )
            .prop_map(|(ops, exit)| BlockShape { ops, exit });
        prop::collection::vec(block, blocks).prop_map(move |blocks| Shape { args, blocks })
    })
}

/// Materializes a [`Shape`]. Operands pick from every value created so far in program order.
pub fn build_shape(shape: &Shape) -> Result<Function> {
    let mut b = FunctionBuilder::new("generated");
    let mut values: Vec<ValueId> = (0..shape.args).map(|_| b.add_argument()).collect();
    let ids: Vec<BlockId> = shape.blocks.iter().map(|_| b.create_block()).collect();

    for (block_shape, &block) in shape.blocks.iter().zip(&ids) {
        for &(lhs, rhs) in &block_shape.ops {
            let lhs = values[lhs % values.len()];
            let rhs = values[rhs % values.len()];
            values.push(b.binary(block, BinaryOp::Add, lhs, rhs)?);
        }
        match block_shape.exit {
            Exit::Ret(value) => b.ret(block, value.map(|v| values[v % values.len()]))?,
            Exit::Br(target) => b.br(block, ids[target])?,
            Exit::CondBr(cond, then_dest, else_dest) if then_dest != else_dest => {
                b.cond_br(block, values[cond % values.len()], ids[then_dest], ids[else_dest])?
            }
            Exit::CondBr(_, target, _) => b.br(block, ids[target])?,
        };
    }
    b.build()
}

/// One instruction of a [`TableGraph`].
#[derive(Debug, Clone, Default)]
pub struct TableInst {
    pub block: usize,
    pub def: Option<u32>,
    pub uses: Vec<u32>,
    /// `(predecessor, value)` pairs; a non-empty list makes this a merge.
    pub incoming: Vec<(usize, u32)>,
}

/// A [`ProgramGraph`] spelled out as tables, with no structural checks of its own.
///
/// Handles are plain integers: blocks and instructions index the tables, values are arbitrary.
#[derive(Debug, Clone, Default)]
pub struct TableGraph {
    pub blocks: Vec<Vec<usize>>,
    pub preds: Vec<Vec<usize>>,
    pub succs: Vec<Vec<usize>>,
    pub insts: Vec<TableInst>,
    pub args: Vec<u32>,
}

impl TableGraph {
    /// Builds a graph from block contents and edges; predecessors are derived from `edges`.
    pub fn new(blocks: Vec<Vec<TableInst>>, edges: &[(usize, usize)]) -> Self {
        let mut graph = TableGraph {
            preds: vec![Vec::new(); blocks.len()],
            succs: vec![Vec::new(); blocks.len()],
            ..TableGraph::default()
        };
        for (b, insts) in blocks.into_iter().enumerate() {
            let mut ids = Vec::new();
            for mut inst in insts {
                inst.block = b;
                ids.push(graph.insts.len());
                graph.insts.push(inst);
            }
            graph.blocks.push(ids);
        }
        for &(from, to) in edges {
            graph.succs[from].push(to);
            graph.preds[to].push(from);
        }
        graph
    }
}

/// An ordinary instruction.
pub fn op(def: Option<u32>, uses: &[u32]) -> TableInst {
    TableInst {
        def,
        uses: uses.to_vec(),
        ..TableInst::default()
    }
}

/// A merge instruction.
pub fn merge(def: u32, incoming: &[(usize, u32)]) -> TableInst {
    TableInst {
        def: Some(def),
        uses: incoming.iter().map(|&(_, v)| v).collect(),
        incoming: incoming.to_vec(),
        ..TableInst::default()
    }
}

impl ProgramGraph for TableGraph {
    type Block = usize;
    type Inst = usize;
    type Value = u32;

    fn entry_block(&self) -> Option<usize> {
        (!self.blocks.is_empty()).then_some(0)
    }

    fn blocks(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        0..self.blocks.len()
    }

    fn instructions(&self, block: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.blocks[block].iter().copied()
    }

    fn predecessors(&self, block: usize) -> impl Iterator<Item = usize> + '_ {
        self.preds[block].iter().copied()
    }

    fn successors(&self, block: usize) -> impl Iterator<Item = usize> + '_ {
        self.succs[block].iter().copied()
    }

    fn block_of(&self, inst: usize) -> usize {
        self.insts[inst].block
    }

    fn operands(&self, inst: usize) -> impl Iterator<Item = u32> + '_ {
        self.insts[inst].uses.iter().copied()
    }

    fn defined_value(&self, inst: usize) -> Option<u32> {
        self.insts[inst].def
    }

    fn arguments(&self) -> impl Iterator<Item = u32> + '_ {
        self.args.iter().copied()
    }

    fn is_trackable(&self, _value: u32) -> bool {
        true
    }

    fn is_merge(&self, inst: usize) -> bool {
        !self.insts[inst].incoming.is_empty()
    }

    fn incoming(&self, inst: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.insts[inst].incoming.iter().copied()
    }

    fn value_name(&self, value: u32) -> String {
        format!("t{value}")
    }

    fn render_instruction(&self, inst: usize) -> String {
        format!("i{inst}")
    }
}

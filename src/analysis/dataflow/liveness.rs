//! Live variable analysis.
//!
//! A value is *live* at a program point if some path from that point reaches a use of the value.
//! In SSA form every value has exactly one definition, so a definition simply ends the live range
//! when walking backwards.
//!
//! # Uses
//!
//! Live variable analysis is essential for:
//! - **Dead code elimination**: a result that is never live is dead
//! - **Register allocation**: values live at the same time need different registers
//! - **Debugging**: determine which values can be inspected at a breakpoint
//!
//! # Algorithm
//!
//! This is a backward may-analysis. The fact attributed to an instruction is the set of values
//! live immediately *before* it:
//!
//! - ordinary instruction: `live_before = (live_after - {def}) ∪ operands`
//! - merge instruction: `live_before = live_after - {def}`
//!
//! Merge operands are not uses at the merge itself. The value a merge selects for the edge
//! `P -> S` is used *on that edge*, so it is live at the end of `P` and nowhere else. The meet
//! accounts for this: the live-out set of `P` is the union over every successor `S` of
//!
//! - the fact of `S`'s first instruction, and
//! - the values the leading merges of `S` select for the edge coming from `P`.
//!
//! Values that the merges of `S` select only for other edges are excluded from `P`'s live-out
//! unless they are also live past the merges (used by an ordinary instruction of `S` or later).
//! That second case is checked: such a value must be present in the fact of the first
//! non-merge instruction of `S`, otherwise the stored facts are inconsistent.

use crate::analysis::{
    dataflow::{
        AnalysisContext, Backward, DataFlowAnalysis, DomainBuilder, Fact, NeighborFact,
    },
    ProgramGraph,
};

/// Live variable analysis over trackable values (instruction results and arguments).
///
/// Stateless; one value can analyze any number of functions.
///
/// # Example
///
/// ```rust
/// use flowscope::{
///     analysis::{DataFlowSolver, LiveVariables},
///     ir::{BinaryOp, FunctionBuilder},
/// };
///
/// let mut b = FunctionBuilder::new("sum");
/// let x = b.add_argument();
/// let y = b.add_argument();
/// let entry = b.create_block();
/// let sum = b.binary(entry, BinaryOp::Add, x, y)?;
/// let ret = b.ret(entry, Some(sum))?;
/// let func = b.build()?;
///
/// let live = DataFlowSolver::new(LiveVariables, &func).try_solve()?;
/// assert!(live.holds(ret, &sum));
/// assert!(!live.holds(ret, &x));
/// # Ok::<(), flowscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveVariables;

impl LiveVariables {
    /// The contribution of successor `succ` to the live-out set of `pred`.
    fn edge_contribution<G: ProgramGraph>(
        pred: G::Block,
        succ: G::Block,
        succ_entry: &Fact,
        cx: &AnalysisContext<'_, G, G::Value>,
    ) -> Fact {
        let graph = cx.graph();
        let mut contribution = succ_entry.clone();
        let mut this_edge = cx.empty_fact();
        let mut other_edges = cx.empty_fact();

        let mut first_ordinary = None;
        for inst in graph.instructions(succ) {
            if !graph.is_merge(inst) {
                first_ordinary = Some(inst);
                break;
            }
            for (from, value) in graph.incoming(inst) {
                let Some(idx) = cx.index_of(&value) else {
                    continue;
                };
                if from == pred {
                    this_edge.insert(idx);
                } else {
                    other_edges.insert(idx);
                }
            }
        }
        other_edges.difference_with(&this_edge);

        if let Some(live_past) = first_ordinary.and_then(|inst| cx.fact_of(inst)) {
            for idx in other_edges.iter().filter(|&idx| contribution.contains(idx)) {
                assert!(
                    live_past.contains(idx),
                    "value {:?} selected only for other edges of {succ:?} is live into it \
                     without being live past its merges",
                    cx.domain().element(idx)
                );
            }
        } else {
            contribution.difference_with(&other_edges);
        }

        contribution.union_with(&this_edge);
        contribution
    }
}

impl<G: ProgramGraph> DataFlowAnalysis<G> for LiveVariables {
    type Element = G::Value;
    type Direction = Backward;

    fn name(&self) -> &'static str {
        "liveness"
    }

    fn collect(&self, graph: &G, inst: G::Inst, domain: &mut DomainBuilder<G::Value>) {
        domain.extend(graph.operands(inst).filter(|&v| graph.is_trackable(v)));
    }

    fn initial(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
        cx.empty_fact()
    }

    fn boundary(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
        cx.empty_fact()
    }

    fn meet(
        &self,
        block: G::Block,
        neighbors: &[NeighborFact<'_, G::Block>],
        cx: &AnalysisContext<'_, G, G::Value>,
    ) -> Fact {
        let mut live_out = cx.empty_fact();
        for neighbor in neighbors {
            live_out.union_with(&Self::edge_contribution(
                block,
                neighbor.block,
                neighbor.fact,
                cx,
            ));
        }
        live_out
    }

    fn transfer(
        &self,
        inst: G::Inst,
        input: &Fact,
        cx: &AnalysisContext<'_, G, G::Value>,
    ) -> Fact {
        let graph = cx.graph();
        let mut live_before = input.clone();

        if let Some(idx) = graph.defined_value(inst).and_then(|v| cx.index_of(&v)) {
            live_before.remove(idx);
        }
        if !graph.is_merge(inst) {
            for idx in graph.operands(inst).filter_map(|v| cx.index_of(&v)) {
                live_before.insert(idx);
            }
        }
        live_before
    }

    fn element_name(&self, graph: &G, element: &G::Value) -> String {
        graph.value_name(*element)
    }
}

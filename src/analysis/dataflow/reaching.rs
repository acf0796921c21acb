//! Reaching definitions analysis.
//!
//! Reaching definitions computes, for each program point, which definitions may reach that point
//! along some path from the function entry.
//!
//! # SSA Form
//!
//! In SSA form every value is defined exactly once, so nothing is ever killed: a definition
//! reaches a point if and only if some path leads from the definition to the point. The analysis
//! is still useful for:
//! - Validating SSA construction (every use should be reached by its definition)
//! - Computing def-use chains
//! - Checking the forward half of the solver against the backward one
//!
//! # Algorithm
//!
//! - `IN[entry]` = the function arguments
//! - `IN[B]` = ∪{OUT[P] | P is a predecessor of B}
//! - `OUT[i]` = `IN[i]` ∪ {def(i)}

use crate::analysis::{
    dataflow::{
        union_of, AnalysisContext, DataFlowAnalysis, DomainBuilder, Fact, Forward, NeighborFact,
    },
    ProgramGraph,
};

/// Reaching definitions over trackable values.
///
/// # Example
///
/// ```rust
/// use flowscope::{
///     analysis::{DataFlowSolver, ReachingDefinitions},
///     ir::{BinaryOp, FunctionBuilder},
/// };
///
/// let mut b = FunctionBuilder::new("inc");
/// let x = b.add_argument();
/// let one = b.constant(1);
/// let entry = b.create_block();
/// let y = b.binary(entry, BinaryOp::Add, x, one)?;
/// let ret = b.ret(entry, Some(y))?;
/// let func = b.build()?;
///
/// let reaching = DataFlowSolver::new(ReachingDefinitions, &func).try_solve()?;
/// assert_eq!(reaching.elements_of(ret), vec![&x, &y]);
/// # Ok::<(), flowscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachingDefinitions;

impl<G: ProgramGraph> DataFlowAnalysis<G> for ReachingDefinitions {
    type Element = G::Value;
    type Direction = Forward;

    fn name(&self) -> &'static str {
        "reaching-definitions"
    }

    fn collect(&self, graph: &G, inst: G::Inst, domain: &mut DomainBuilder<G::Value>) {
        domain.extend(graph.operands(inst).filter(|&v| graph.is_trackable(v)));
        domain.extend(graph.defined_value(inst));
    }

    fn initial(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
        cx.empty_fact()
    }

    fn boundary(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
        let arguments: Vec<G::Value> = cx.graph().arguments().collect();
        cx.domain().fact_of(&arguments)
    }

    fn meet(
        &self,
        _block: G::Block,
        neighbors: &[NeighborFact<'_, G::Block>],
        cx: &AnalysisContext<'_, G, G::Value>,
    ) -> Fact {
        union_of(cx.domain().len(), neighbors.iter().map(|n| n.fact))
    }

    fn transfer(
        &self,
        inst: G::Inst,
        input: &Fact,
        cx: &AnalysisContext<'_, G, G::Value>,
    ) -> Fact {
        let mut out = input.clone();
        if let Some(idx) = cx.graph().defined_value(inst).and_then(|v| cx.index_of(&v)) {
            out.insert(idx);
        }
        out
    }

    fn element_name(&self, graph: &G, element: &G::Value) -> String {
        graph.value_name(*element)
    }
}

//! The client side of the data flow framework.
//!
//! An analysis is written by implementing [`DataFlowAnalysis`]. It supplies the domain elements
//! it wants to track and the four extension points the solver drives:
//!
//! - the **initial condition**, the fact every instruction starts with
//! - the **boundary condition**, the entry fact of blocks with no neighbours on the relevant side
//! - the **meet operator**, combining neighbour facts into a block entry fact
//! - the **transfer function**, deriving an instruction's fact from its incoming fact
//!
//! The solver handles everything else: building and freezing the domain, seeding the fact store,
//! sweep order, change detection and convergence.
//!
//! # Example
//!
//! A forward analysis tracking which values have been defined so far:
//!
//! ```rust
//! use flowscope::analysis::{
//!     AnalysisContext, DataFlowAnalysis, DomainBuilder, Fact, Forward, NeighborFact,
//!     ProgramGraph, union_of,
//! };
//!
//! struct Defined;
//!
//! impl<G: ProgramGraph> DataFlowAnalysis<G> for Defined {
//!     type Element = G::Value;
//!     type Direction = Forward;
//!
//!     fn collect(&self, graph: &G, inst: G::Inst, domain: &mut DomainBuilder<G::Value>) {
//!         domain.extend(graph.defined_value(inst));
//!     }
//!
//!     fn initial(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
//!         cx.empty_fact()
//!     }
//!
//!     fn boundary(&self, cx: &AnalysisContext<'_, G, G::Value>) -> Fact {
//!         cx.empty_fact()
//!     }
//!
//!     fn meet(
//!         &self,
//!         _block: G::Block,
//!         neighbors: &[NeighborFact<'_, G::Block>],
//!         cx: &AnalysisContext<'_, G, G::Value>,
//!     ) -> Fact {
//!         union_of(cx.domain().len(), neighbors.iter().map(|n| n.fact))
//!     }
//!
//!     fn transfer(
//!         &self,
//!         inst: G::Inst,
//!         input: &Fact,
//!         cx: &AnalysisContext<'_, G, G::Value>,
//!     ) -> Fact {
//!         let mut out = input.clone();
//!         if let Some(idx) = cx.graph().defined_value(inst).and_then(|v| cx.index_of(&v)) {
//!             out.insert(idx);
//!         }
//!         out
//!     }
//! }
//! ```

use crate::analysis::{
    dataflow::{DirectionStrategy, Domain, DomainBuilder, DomainElement, Fact, FactStore},
    ProgramGraph,
};

/// A fact exported by a neighbouring block, handed to [`DataFlowAnalysis::meet`].
#[derive(Debug, Clone, Copy)]
pub struct NeighborFact<'a, B> {
    /// The neighbouring block (a predecessor for forward analyses, a successor for backward ones).
    pub block: B,
    /// The fact of the neighbour's last instruction in traversal order.
    pub fact: &'a Fact,
}

/// Read-only view of a run, passed to every extension point.
pub struct AnalysisContext<'a, G: ProgramGraph, E> {
    graph: &'a G,
    domain: &'a Domain<E>,
    store: &'a FactStore<G::Inst>,
}

impl<'a, G: ProgramGraph, E: DomainElement> AnalysisContext<'a, G, E> {
    /// Creates a context over a graph, a frozen domain and a fact store.
    ///
    /// The solver builds these itself. Constructing one by hand is useful for exercising the
    /// operators of an analysis in isolation, for example against
    /// [`AnalysisResults::store`](super::AnalysisResults::store).
    #[must_use]
    pub fn new(graph: &'a G, domain: &'a Domain<E>, store: &'a FactStore<G::Inst>) -> Self {
        Self {
            graph,
            domain,
            store,
        }
    }

    /// The analyzed graph.
    #[must_use]
    pub fn graph(&self) -> &'a G {
        self.graph
    }

    /// The frozen domain of this run.
    #[must_use]
    pub fn domain(&self) -> &'a Domain<E> {
        self.domain
    }

    /// Index of `element` in the domain.
    #[must_use]
    pub fn index_of(&self, element: &E) -> Option<usize> {
        self.domain.index_of(element)
    }

    /// The current fact of `inst`. `None` only while the store is being seeded.
    #[must_use]
    pub fn fact_of(&self, inst: G::Inst) -> Option<&'a Fact> {
        self.store.get(inst)
    }

    /// An empty fact sized to the domain.
    #[must_use]
    pub fn empty_fact(&self) -> Fact {
        self.domain.empty_fact()
    }
}

/// A monotone data flow analysis over a [`ProgramGraph`].
///
/// Every operator must be monotone with respect to subset inclusion on [`Fact`]s. The solver
/// cannot check this in general; a non-monotone client may never converge (use
/// [`SolverConfig::set_max_sweeps`](super::SolverConfig::set_max_sweeps) to bound the run) or
/// converge to a wrong answer. With
/// [`SolverConfig::set_verify_fixpoint`](super::SolverConfig::set_verify_fixpoint) enabled the
/// solver at least asserts that the converged facts are stable.
///
/// The fact the solver attributes to an instruction is the output of its transfer function:
/// the state after the instruction for forward analyses and before it for backward ones.
pub trait DataFlowAnalysis<G: ProgramGraph> {
    /// The type of the tracked elements.
    type Element: DomainElement;

    /// [`Forward`](super::Forward) or [`Backward`](super::Backward).
    type Direction: DirectionStrategy;

    /// Short name used in log output.
    fn name(&self) -> &'static str {
        "dataflow"
    }

    /// Reports the elements `inst` contributes to the domain.
    ///
    /// Called exactly once per instruction, in block order then instruction order, before any
    /// fact exists.
    fn collect(&self, graph: &G, inst: G::Inst, domain: &mut DomainBuilder<Self::Element>);

    /// The fact every instruction is seeded with.
    fn initial(&self, cx: &AnalysisContext<'_, G, Self::Element>) -> Fact;

    /// The entry fact of blocks without neighbours on the relevant side.
    fn boundary(&self, cx: &AnalysisContext<'_, G, Self::Element>) -> Fact;

    /// Combines the facts exported by the neighbours of `block` into its entry fact.
    ///
    /// `neighbors` is never empty; blocks without neighbours receive the boundary condition.
    fn meet(
        &self,
        block: G::Block,
        neighbors: &[NeighborFact<'_, G::Block>],
        cx: &AnalysisContext<'_, G, Self::Element>,
    ) -> Fact;

    /// Derives the fact of `inst` from the fact flowing into it.
    fn transfer(
        &self,
        inst: G::Inst,
        input: &Fact,
        cx: &AnalysisContext<'_, G, Self::Element>,
    ) -> Fact;

    /// Printable name of an element, used by [`AnalysisResults::dump`](super::AnalysisResults::dump).
    fn element_name(&self, _graph: &G, element: &Self::Element) -> String {
        format!("{element:?}")
    }
}

//! Converged analysis results.

use std::{collections::HashMap, fmt::Write};

use crate::analysis::{
    dataflow::{Direction, Domain, DomainElement, Fact, FactStore},
    ProgramGraph,
};

/// The entry fact of a block on the converging sweep, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFact {
    /// The block has no neighbours on the relevant side and starts from the boundary condition.
    Boundary(Fact),
    /// The fact is the meet of the neighbours' exported facts.
    Meet(Fact),
}

impl EntryFact {
    /// The fact itself, regardless of its origin.
    #[must_use]
    pub fn fact(&self) -> &Fact {
        match self {
            EntryFact::Boundary(fact) | EntryFact::Meet(fact) => fact,
        }
    }

    /// Returns `true` for [`EntryFact::Boundary`].
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        matches!(self, EntryFact::Boundary(_))
    }
}

/// Counters collected during one solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Number of sweeps, including the final one that changed nothing.
    pub sweeps: usize,
    /// Number of meet operator invocations.
    pub meets: usize,
    /// Number of transfer function invocations.
    pub transfers: usize,
    /// Number of transfer invocations whose result differed from the stored fact.
    pub changed_instructions: usize,
    /// Number of elements in the domain.
    pub domain_size: usize,
    /// Number of instructions in the analyzed graph.
    pub instructions: usize,
}

/// The output of a converged run: the fact of every instruction over a frozen domain.
///
/// Results are self-contained; they keep no reference to the graph or the analysis. Methods
/// taking a graph expect the same graph the run analyzed.
#[derive(Debug, Clone)]
pub struct AnalysisResults<G: ProgramGraph, E> {
    domain: Domain<E>,
    names: Vec<String>,
    store: FactStore<G::Inst>,
    entry_facts: HashMap<G::Block, EntryFact>,
    direction: Direction,
    stats: SolverStats,
}

impl<G: ProgramGraph, E: DomainElement> AnalysisResults<G, E> {
    pub(crate) fn new(
        domain: Domain<E>,
        names: Vec<String>,
        store: FactStore<G::Inst>,
        entry_facts: HashMap<G::Block, EntryFact>,
        direction: Direction,
        stats: SolverStats,
    ) -> Self {
        debug_assert_eq!(names.len(), domain.len());
        Self {
            domain,
            names,
            store,
            entry_facts,
            direction,
            stats,
        }
    }

    /// The domain the facts are expressed over.
    #[must_use]
    pub fn domain(&self) -> &Domain<E> {
        &self.domain
    }

    /// The raw per-instruction facts.
    #[must_use]
    pub fn store(&self) -> &FactStore<G::Inst> {
        &self.store
    }

    /// The direction of the analysis that produced these results.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Counters of the run.
    #[must_use]
    pub const fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// The fact attributed to `inst`, or `None` if `inst` is not part of the analyzed graph.
    #[must_use]
    pub fn fact_of(&self, inst: G::Inst) -> Option<&Fact> {
        self.store.get(inst)
    }

    /// The elements holding at `inst`, in domain index order. Empty for unknown instructions.
    pub fn elements_of(&self, inst: G::Inst) -> Vec<&E> {
        self.fact_of(inst)
            .map(|fact| self.domain.decode(fact).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `element` holds at `inst`.
    #[must_use]
    pub fn holds(&self, inst: G::Inst, element: &E) -> bool {
        match (self.fact_of(inst), self.domain.index_of(element)) {
            (Some(fact), Some(idx)) => fact.contains(idx),
            _ => false,
        }
    }

    /// The entry fact `block` received on the converging sweep.
    #[must_use]
    pub fn entry_fact(&self, block: G::Block) -> Option<&EntryFact> {
        self.entry_facts.get(&block)
    }

    /// Renders every instruction with its fact, in program order.
    ///
    /// The block's first instruction in traversal order is preceded by the block entry fact,
    /// labelled `BC:` for boundary blocks and `MeetOp:` otherwise. Facts list element names in
    /// domain index order, each followed by a comma. The format is meant for humans and golden
    /// tests, not for parsing.
    #[must_use]
    pub fn dump(&self, graph: &G) -> String {
        let mut out = String::new();
        out.push_str("***********************************\n");
        out.push_str("* Instruction-BitVector Mapping    \n");
        out.push_str("***********************************\n");

        for block in graph.blocks() {
            let first = match self.direction {
                Direction::Forward => graph.instructions(block).next(),
                Direction::Backward => graph.instructions(block).next_back(),
            };
            for inst in graph.instructions(block) {
                if Some(inst) == first {
                    if let Some(entry) = self.entry_facts.get(&block) {
                        let label = if entry.is_boundary() { "BC" } else { "MeetOp" };
                        let _ = writeln!(out, "{label}:\t{}", self.render_fact(entry.fact()));
                    }
                }
                let _ = writeln!(out, "Instruction: {}", graph.render_instruction(inst));
                let rendered = self
                    .fact_of(inst)
                    .map_or_else(|| "{}".to_string(), |fact| self.render_fact(fact));
                let _ = writeln!(out, "\t{rendered}");
            }
        }
        out
    }

    fn render_fact(&self, fact: &Fact) -> String {
        let mut out = String::from("{");
        for idx in fact.iter() {
            out.push_str(&self.names[idx]);
            out.push(',');
        }
        out.push('}');
        out
    }
}

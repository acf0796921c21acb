//! Round-robin fixpoint solver.
//!
//! The solver drives a [`DataFlowAnalysis`] over one [`ProgramGraph`] until its facts stop
//! changing.
//!
//! # Algorithm
//!
//! 1. Collect the domain by asking the analysis about every instruction once, then freeze it
//! 2. Seed every instruction with the initial condition; compute the boundary condition
//! 3. Sweep: visit every block in direction order. The block's entry fact is the boundary
//!    condition if it has no neighbours on the relevant side, and the meet of the neighbours'
//!    exported facts otherwise. Thread the entry fact through the block's instructions in
//!    direction order, storing each transfer result
//! 4. Repeat step 3 until a whole sweep leaves every stored fact unchanged
//!
//! # Termination
//!
//! Facts are bit sets over a finite domain, so each one can only grow (or shrink) a bounded number
//! of times. With monotone operators the solver therefore converges after at most
//! `domain size * instruction count + 1` sweeps, and in practice after a handful. A broken client
//! can loop forever; [`SolverConfig::set_max_sweeps`] turns that into an
//! [`Error::NonConvergence`].
//!
//! # Lifecycle
//!
//! A solver moves through [`SolverState`]s and never goes back:
//!
//! ```text
//! Uninitialized --initialize()--> Initialized --sweep()--> Iterating --sweep() == false--> Converged
//! ```
//!
//! [`DataFlowSolver::try_solve`] runs all of it; the step methods exist for callers that want to
//! observe intermediate facts.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use strum::Display;

use crate::{
    analysis::{
        dataflow::{
            AnalysisContext, AnalysisResults, DataFlowAnalysis, DirectionStrategy, Domain,
            DomainBuilder, EntryFact, Fact, FactStore, NeighborFact, SolverConfig, SolverStats,
        },
        ProgramGraph,
    },
    Error, Result,
};

/// Where a [`DataFlowSolver`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolverState {
    /// Constructed; no domain exists yet.
    Uninitialized,
    /// Domain frozen, facts seeded with the initial condition.
    Initialized,
    /// At least one sweep ran and the last one changed some fact.
    Iterating,
    /// A sweep changed nothing. Terminal.
    Converged,
}

/// Per-run fixpoint solver.
///
/// # Usage
///
/// ```rust
/// use flowscope::{
///     analysis::{DataFlowSolver, LiveVariables},
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
/// let results = DataFlowSolver::new(LiveVariables, &func).try_solve()?;
/// assert_eq!(results.elements_of(ret), vec![&y]);
/// # Ok::<(), flowscope::Error>(())
/// ```
pub struct DataFlowSolver<'g, G: ProgramGraph, A: DataFlowAnalysis<G>> {
    /// The analysis being solved.
    analysis: A,
    /// The graph under analysis.
    graph: &'g G,
    config: SolverConfig,
    state: SolverState,
    /// Blocks in traversal order, each with its instructions in traversal order.
    plan: Vec<(G::Block, Vec<G::Inst>)>,
    domain: Option<Domain<A::Element>>,
    store: FactStore<G::Inst>,
    boundary: Option<Fact>,
    /// Entry fact of each block on the most recent sweep.
    entry_facts: HashMap<G::Block, EntryFact>,
    stats: SolverStats,
}

impl<'g, G: ProgramGraph, A: DataFlowAnalysis<G>> DataFlowSolver<'g, G, A> {
    /// Creates a solver with the default configuration.
    #[must_use]
    pub fn new(analysis: A, graph: &'g G) -> Self {
        Self::with_config(analysis, graph, SolverConfig::default())
    }

    /// Creates a solver with an explicit configuration.
    #[must_use]
    pub fn with_config(analysis: A, graph: &'g G, config: SolverConfig) -> Self {
        Self {
            analysis,
            graph,
            config,
            state: SolverState::Uninitialized,
            plan: Vec::new(),
            domain: None,
            store: FactStore::default(),
            boundary: None,
            entry_facts: HashMap::new(),
            stats: SolverStats::default(),
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SolverState {
        self.state
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// The configuration of this solver.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The analysis being solved.
    #[must_use]
    pub const fn analysis(&self) -> &A {
        &self.analysis
    }

    /// The frozen domain, once initialized.
    #[must_use]
    pub fn domain(&self) -> Option<&Domain<A::Element>> {
        self.domain.as_ref()
    }

    /// The current fact of `inst`, once initialized.
    #[must_use]
    pub fn fact_of(&self, inst: G::Inst) -> Option<&Fact> {
        self.store.get(inst)
    }

    /// Builds the domain and seeds every instruction with the initial condition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if graph validation is enabled and the graph has an empty
    /// block, an instruction whose [`block_of`](ProgramGraph::block_of) disagrees with the block
    /// listing it, or CFG edges that are not symmetric. Merge instructions are rejected when
    /// their incoming blocks are not exactly the block's predecessors or when they follow an
    /// ordinary instruction of their block.
    ///
    /// # Panics
    ///
    /// Panics if the solver is already initialized, if an instruction appears in more than one
    /// block, or if the initial or boundary condition is not sized to the domain.
    pub fn initialize(&mut self) -> Result<()> {
        assert_eq!(
            self.state,
            SolverState::Uninitialized,
            "solver initialized twice"
        );
        let graph = self.graph;

        if self.config.validate_graph() {
            validate_graph(graph)?;
        }

        let mut builder = DomainBuilder::new();
        for block in graph.blocks() {
            for inst in graph.instructions(block) {
                self.analysis.collect(graph, inst, &mut builder);
            }
        }
        let domain = builder.freeze();

        self.plan = A::Direction::block_order(graph)
            .map(|block| (block, A::Direction::instruction_order(graph, block).collect()))
            .collect();

        let (initial, boundary) = {
            let cx = AnalysisContext::new(graph, &domain, &self.store);
            (self.analysis.initial(&cx), self.analysis.boundary(&cx))
        };
        assert_eq!(
            initial.width(),
            domain.len(),
            "initial condition is not sized to the domain"
        );
        assert_eq!(
            boundary.width(),
            domain.len(),
            "boundary condition is not sized to the domain"
        );

        let instructions = self.plan.iter().map(|(_, insts)| insts.len()).sum();
        let mut store = FactStore::with_capacity(instructions);
        for inst in self.plan.iter().flat_map(|(_, insts)| insts) {
            store.seed(*inst, initial.clone());
        }

        self.stats.domain_size = domain.len();
        self.stats.instructions = instructions;
        self.store = store;
        self.boundary = Some(boundary);
        self.domain = Some(domain);
        self.state = SolverState::Initialized;

        debug!(
            "{} ({}): initialized, {} blocks, {} instructions, {} domain elements",
            self.analysis.name(),
            A::Direction::DIRECTION,
            self.plan.len(),
            self.stats.instructions,
            self.stats.domain_size
        );
        Ok(())
    }

    /// Runs one sweep over every block. Returns `true` if any stored fact changed.
    ///
    /// After convergence a further sweep only verifies the fixpoint: it recomputes every fact
    /// and returns `false`. Verification sweeps are not counted in [`SolverStats`].
    ///
    /// # Panics
    ///
    /// Panics if the solver is not initialized, if an operator returns a fact of the wrong
    /// width, or if a verification sweep after convergence changes a fact (the analysis is not
    /// monotone or not deterministic).
    pub fn sweep(&mut self) -> bool {
        let (Some(domain), Some(boundary)) = (self.domain.as_ref(), self.boundary.as_ref()) else {
            panic!("sweep called on an uninitialized solver");
        };
        let graph = self.graph;
        let verifying = self.state == SolverState::Converged;
        let mut changed = false;
        let mut meets = 0;
        let mut transfers = 0;
        let mut changed_instructions = 0;

        for (block, insts) in &self.plan {
            let block = *block;
            let entry = if A::Direction::uses_boundary(graph, block) {
                EntryFact::Boundary(boundary.clone())
            } else {
                let neighbors: Vec<NeighborFact<'_, G::Block>> =
                    A::Direction::meet_neighbors(graph, block)
                        .filter_map(|neighbor| {
                            let exit = A::Direction::exit_instruction(graph, neighbor)?;
                            Some(NeighborFact {
                                block: neighbor,
                                fact: self.store.get(exit)?,
                            })
                        })
                        .collect();
                if neighbors.is_empty() {
                    EntryFact::Boundary(boundary.clone())
                } else {
                    meets += 1;
                    let cx = AnalysisContext::new(graph, domain, &self.store);
                    EntryFact::Meet(self.analysis.meet(block, &neighbors, &cx))
                }
            };
            assert_eq!(
                entry.fact().width(),
                domain.len(),
                "meet operator produced a fact over a different domain"
            );

            let mut current = entry.fact().clone();
            for &inst in insts {
                let out = {
                    let cx = AnalysisContext::new(graph, domain, &self.store);
                    self.analysis.transfer(inst, &current, &cx)
                };
                transfers += 1;
                if self.store.update(inst, out.clone()) {
                    changed = true;
                    changed_instructions += 1;
                    trace!("  {inst:?} in {block:?} -> {out:?}");
                }
                current = out;
            }
            self.entry_facts.insert(block, entry);
        }

        if verifying {
            assert!(
                !changed,
                "{}: facts changed after convergence; the analysis is not monotone",
                self.analysis.name()
            );
            return false;
        }

        self.stats.sweeps += 1;
        self.stats.meets += meets;
        self.stats.transfers += transfers;
        self.stats.changed_instructions += changed_instructions;
        trace!(
            "{}: sweep {} {}",
            self.analysis.name(),
            self.stats.sweeps,
            if changed { "changed facts" } else { "reached a fixpoint" }
        );
        self.state = if changed {
            SolverState::Iterating
        } else {
            SolverState::Converged
        };
        changed
    }

    /// Sweeps until convergence and returns the results.
    ///
    /// Initializes the solver first if that has not happened yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for a malformed graph (see [`initialize`](Self::initialize))
    /// and [`Error::NonConvergence`] if a configured sweep limit is reached before a sweep
    /// leaves every fact unchanged.
    pub fn try_solve(mut self) -> Result<AnalysisResults<G, A::Element>> {
        if self.state == SolverState::Uninitialized {
            self.initialize()?;
        }
        while self.state != SolverState::Converged {
            if let Some(max) = self.config.max_sweeps() {
                if self.stats.sweeps >= max {
                    debug!(
                        "{}: no fixpoint after {} sweeps",
                        self.analysis.name(),
                        self.stats.sweeps
                    );
                    return Err(Error::NonConvergence {
                        sweeps: self.stats.sweeps,
                    });
                }
            }
            self.sweep();
        }
        Ok(self.finish())
    }

    /// Like [`try_solve`](Self::try_solve), for graphs known to be well formed.
    ///
    /// # Panics
    ///
    /// Panics with the error message if [`try_solve`](Self::try_solve) fails.
    #[must_use]
    pub fn solve(self) -> AnalysisResults<G, A::Element> {
        match self.try_solve() {
            Ok(results) => results,
            Err(error) => panic!("{error}"),
        }
    }

    /// Hands out the results of a converged run.
    ///
    /// Runs a verification sweep first if [`SolverConfig::verify_fixpoint`] is set.
    ///
    /// # Panics
    ///
    /// Panics if the solver has not converged.
    #[must_use]
    pub fn finish(mut self) -> AnalysisResults<G, A::Element> {
        assert_eq!(
            self.state,
            SolverState::Converged,
            "results requested before convergence"
        );
        if self.config.verify_fixpoint() {
            self.sweep();
        }

        debug!(
            "{} ({}): converged after {} sweeps, {} meets, {} transfers, {} fact changes",
            self.analysis.name(),
            A::Direction::DIRECTION,
            self.stats.sweeps,
            self.stats.meets,
            self.stats.transfers,
            self.stats.changed_instructions
        );

        let Some(domain) = self.domain else {
            unreachable!("a converged solver has a domain");
        };
        let names = domain
            .iter()
            .map(|element| self.analysis.element_name(self.graph, element))
            .collect();
        AnalysisResults::new(
            domain,
            names,
            self.store,
            self.entry_facts,
            A::Direction::DIRECTION,
            self.stats,
        )
    }
}

/// Checks the structural assumptions the solver relies on.
fn validate_graph<G: ProgramGraph>(graph: &G) -> Result<()> {
    for block in graph.blocks() {
        if graph.instructions(block).next().is_none() {
            return Err(malformed_error!("Block {:?} has no instructions", block));
        }

        for succ in graph.successors(block) {
            if !graph.predecessors(succ).any(|pred| pred == block) {
                return Err(malformed_error!(
                    "Edge {:?} -> {:?} is missing from the predecessors of {:?}",
                    block,
                    succ,
                    succ
                ));
            }
        }
        for pred in graph.predecessors(block) {
            if !graph.successors(pred).any(|succ| succ == block) {
                return Err(malformed_error!(
                    "Edge {:?} -> {:?} is missing from the successors of {:?}",
                    pred,
                    block,
                    pred
                ));
            }
        }

        let preds: HashSet<G::Block> = graph.predecessors(block).collect();
        let mut ordinary = None;
        for inst in graph.instructions(block) {
            let owner = graph.block_of(inst);
            if owner != block {
                return Err(malformed_error!(
                    "Instruction {:?} is listed in {:?} but belongs to {:?}",
                    inst,
                    block,
                    owner
                ));
            }
            if !graph.is_merge(inst) {
                ordinary.get_or_insert(inst);
            } else if let Some(first) = ordinary {
                return Err(malformed_error!(
                    "Merge {:?} in {:?} follows the non-merge instruction {:?}",
                    inst,
                    block,
                    first
                ));
            } else {
                let incoming: HashSet<G::Block> = graph.incoming(inst).map(|(b, _)| b).collect();
                if incoming != preds {
                    return Err(malformed_error!(
                        "Merge {:?} in {:?} selects from {:?} but the block has predecessors {:?}",
                        inst,
                        block,
                        incoming,
                        preds
                    ));
                }
            }
        }
    }
    Ok(())
}

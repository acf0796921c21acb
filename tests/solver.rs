//! Solver lifecycle, limits and graph validation.

mod common;

use common::{chain, merge, op, scenario, TableGraph};
use flowscope::{
    analysis::{
        analyze_all, DataFlowSolver, LiveVariables, ReachingDefinitions, SolverConfig,
        SolverState,
    },
    Error, Result,
};

fn assert_malformed<T>(result: Result<T>, needle: &str) {
    match result {
        Err(Error::Malformed { message, .. }) => assert!(
            message.contains(needle),
            "expected '{needle}' in '{message}'"
        ),
        Err(other) => panic!("expected a malformed graph error, got {other}"),
        Ok(_) => panic!("expected a malformed graph error, got results"),
    }
}

#[test]
fn stepwise_matches_try_solve() -> Result<()> {
    let s = scenario()?;
    let mut solver = DataFlowSolver::new(LiveVariables, &s.func);
    assert_eq!(solver.state(), SolverState::Uninitialized);
    assert!(solver.domain().is_none());

    solver.initialize()?;
    assert_eq!(solver.state(), SolverState::Initialized);
    assert_eq!(solver.domain().map(|d| d.len()), Some(5));
    // seeded, not yet computed
    assert!(solver.fact_of(s.last(s.exit)).unwrap().is_empty());

    let mut sweeps = 0;
    while solver.sweep() {
        sweeps += 1;
        assert_eq!(solver.state(), SolverState::Iterating);
    }
    assert_eq!(solver.state(), SolverState::Converged);
    assert_eq!(solver.stats().sweeps, sweeps + 1);

    let stepped = solver.finish();
    let direct = DataFlowSolver::new(LiveVariables, &s.func).try_solve()?;
    assert_eq!(stepped.dump(&s.func), direct.dump(&s.func));
    assert_eq!(stepped.stats(), direct.stats());
    Ok(())
}

#[test]
fn acyclic_backward_run_converges_in_two_sweeps() -> Result<()> {
    // Reverse program order visits every block after all of its successors.
    let s = scenario()?;
    let live = DataFlowSolver::new(LiveVariables, &s.func).try_solve()?;
    assert_eq!(live.stats().sweeps, 2);

    let func = chain(16)?;
    let reaching = DataFlowSolver::new(ReachingDefinitions, &func).try_solve()?;
    assert_eq!(reaching.stats().sweeps, 2);
    assert_eq!(reaching.stats().instructions, 32);
    Ok(())
}

#[test]
fn converged_facts_survive_another_sweep() -> Result<()> {
    let s = scenario()?;
    let mut config = SolverConfig::new();
    config.set_verify_fixpoint(false);

    let mut solver = DataFlowSolver::with_config(ReachingDefinitions, &s.func, config);
    solver.initialize()?;
    while solver.sweep() {}
    let before = *solver.stats();
    let converged = solver.fact_of(s.last(s.exit)).cloned();

    assert!(!solver.sweep());
    assert_eq!(solver.fact_of(s.last(s.exit)).cloned(), converged);
    assert_eq!(solver.stats(), &before);

    let results = solver.finish();
    assert_eq!(results.fact_of(s.last(s.exit)).cloned(), converged);
    Ok(())
}

#[test]
fn sweep_limit_reports_non_convergence() -> Result<()> {
    let s = scenario()?;
    let mut config = SolverConfig::new();
    config.set_max_sweeps(Some(1));

    match DataFlowSolver::with_config(LiveVariables, &s.func, config.clone()).try_solve() {
        Err(Error::NonConvergence { sweeps }) => assert_eq!(sweeps, 1),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("two sweeps are needed, one allowed"),
    }

    config.set_max_sweeps(Some(2));
    let live = DataFlowSolver::with_config(LiveVariables, &s.func, config).try_solve()?;
    assert_eq!(live.stats().sweeps, 2);
    Ok(())
}

#[test]
fn rejects_empty_block() {
    let graph = TableGraph::new(vec![vec![op(None, &[])], vec![]], &[(0, 1)]);
    assert_malformed(
        DataFlowSolver::new(LiveVariables, &graph).try_solve(),
        "no instructions",
    );
}

#[test]
fn rejects_merge_that_disagrees_with_predecessors() {
    let graph = TableGraph::new(
        vec![
            vec![op(Some(1), &[])],
            vec![op(Some(2), &[])],
            vec![merge(3, &[(0, 1)]), op(None, &[3])],
        ],
        &[(0, 2), (1, 2)],
    );
    assert_malformed(
        DataFlowSolver::new(ReachingDefinitions, &graph).try_solve(),
        "selects from",
    );
}

#[test]
fn rejects_merge_after_ordinary_instruction() {
    // Liveness would see t1 and t2 die at the ends of blocks 0 and 1 if this were accepted.
    let graph = TableGraph::new(
        vec![
            vec![op(Some(1), &[]), op(None, &[])],
            vec![op(Some(2), &[]), op(None, &[])],
            vec![op(Some(5), &[]), merge(9, &[(0, 1), (1, 2)]), op(None, &[9])],
        ],
        &[(0, 2), (1, 2)],
    );
    assert_malformed(
        DataFlowSolver::new(LiveVariables, &graph).try_solve(),
        "follows the non-merge instruction",
    );

    // the same block with its merge in front is accepted
    let mut leading = graph.clone();
    leading.blocks[2].swap(0, 1);
    let live = DataFlowSolver::new(LiveVariables, &leading).try_solve().unwrap();
    assert_eq!(live.elements_of(1), vec![&1]);
    assert_eq!(live.elements_of(3), vec![&2]);
}

#[test]
fn rejects_misattributed_instruction() {
    let mut graph = TableGraph::new(
        vec![vec![op(Some(1), &[])], vec![op(None, &[1])]],
        &[(0, 1)],
    );
    graph.insts[1].block = 0;
    assert_malformed(
        DataFlowSolver::new(LiveVariables, &graph).try_solve(),
        "belongs to",
    );
}

#[test]
fn rejects_asymmetric_edges() {
    let mut graph = TableGraph::new(
        vec![vec![op(Some(1), &[])], vec![op(None, &[1])]],
        &[(0, 1)],
    );
    graph.preds[1].clear();
    assert_malformed(
        DataFlowSolver::new(LiveVariables, &graph).try_solve(),
        "missing from the predecessors",
    );

    let mut graph = TableGraph::new(
        vec![vec![op(Some(1), &[])], vec![op(None, &[1])]],
        &[(0, 1)],
    );
    graph.succs[0].clear();
    assert_malformed(
        DataFlowSolver::new(LiveVariables, &graph).try_solve(),
        "missing from the successors",
    );
}

#[test]
fn validation_can_be_disabled() {
    // An empty block exports nothing; its neighbours fall back to the boundary condition.
    let graph = TableGraph::new(
        vec![vec![op(Some(1), &[]), op(None, &[1])], vec![]],
        &[(0, 1)],
    );
    let mut config = SolverConfig::new();
    config.set_validate_graph(false);

    let live = DataFlowSolver::with_config(LiveVariables, &graph, config)
        .try_solve()
        .unwrap();
    assert!(live.entry_fact(0).unwrap().is_boundary());
    assert_eq!(live.elements_of(1), vec![&1]);
    assert!(live.elements_of(0).is_empty());
}

#[test]
fn batch_reports_each_function_independently() -> Result<()> {
    let funcs = vec![chain(3)?, chain(5)?];

    let results = analyze_all(&ReachingDefinitions, &funcs, &SolverConfig::new());
    assert_eq!(results.len(), 2);
    for (func, result) in funcs.iter().zip(&results) {
        let result = result.as_ref().expect("chain is well formed");
        assert_eq!(result.stats().instructions, func.instruction_count());
        assert_eq!(result.domain().len(), func.block_count() + 1);
    }
    Ok(())
}

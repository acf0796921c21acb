//! Running one analysis over many functions.
//!
//! Functions are independent: every run builds its own domain and fact store, so they can be
//! analyzed in parallel without sharing any mutable state. Each run itself stays sequential.

use rayon::prelude::*;

use crate::{
    analysis::{
        dataflow::{AnalysisResults, DataFlowAnalysis, DataFlowSolver, SolverConfig},
        ProgramGraph,
    },
    Result,
};

/// Runs `analysis` over every function in parallel.
///
/// Each run gets its own clone of `analysis` and of `config`. Results are returned in the order of
/// `functions`; one malformed function does not affect the others.
///
/// # Example
///
/// ```rust
/// use flowscope::{
///     analysis::{analyze_all, LiveVariables, SolverConfig},
///     ir::FunctionBuilder,
/// };
///
/// let functions: Vec<_> = (0..4)
///     .map(|i| {
///         let mut b = FunctionBuilder::new(format!("f{i}"));
///         let x = b.add_argument();
///         let entry = b.create_block();
///         b.ret(entry, Some(x)).unwrap();
///         b.build().unwrap()
///     })
///     .collect();
///
/// let results = analyze_all(&LiveVariables, &functions, &SolverConfig::default());
/// assert_eq!(results.len(), 4);
/// assert!(results.iter().all(|r| r.is_ok()));
/// ```
pub fn analyze_all<G, A>(
    analysis: &A,
    functions: &[G],
    config: &SolverConfig,
) -> Vec<Result<AnalysisResults<G, A::Element>>>
where
    G: ProgramGraph + Sync,
    G::Block: Send,
    G::Inst: Send,
    A: DataFlowAnalysis<G> + Clone + Sync,
{
    functions
        .par_iter()
        .map(|function| {
            DataFlowSolver::with_config(analysis.clone(), function, config.clone()).try_solve()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::LiveVariables,
        ir::{BinaryOp, Function, FunctionBuilder},
    };

    fn chain(name: &str, length: usize) -> Function {
        let mut b = FunctionBuilder::new(name);
        let x = b.add_argument();
        let entry = b.create_block();
        let mut current = x;
        for _ in 0..length {
            current = b.binary(entry, BinaryOp::Add, current, x).unwrap();
        }
        b.ret(entry, Some(current)).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_results_match_sequential_runs() {
        let functions: Vec<_> = (0..16).map(|i| chain(&format!("f{i}"), i)).collect();
        let config = SolverConfig::default();

        let parallel = analyze_all(&LiveVariables, &functions, &config);
        assert_eq!(parallel.len(), functions.len());

        for (function, result) in functions.iter().zip(parallel) {
            let result = result.unwrap();
            let sequential = DataFlowSolver::new(LiveVariables, function).solve();
            assert_eq!(result.domain().len(), sequential.domain().len());
            assert_eq!(result.dump(function), sequential.dump(function));
        }
    }

    #[test]
    fn test_error_is_per_function() {
        let good = chain("good", 2);
        let mut config = SolverConfig::new();
        config.set_max_sweeps(Some(0));

        let results = analyze_all(&LiveVariables, &[good], &config);
        assert!(matches!(
            results[0],
            Err(crate::Error::NonConvergence { sweeps: 0 })
        ));
    }
}

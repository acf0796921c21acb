/// Configuration for the data flow solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on the number of sweeps, `None` to run until convergence
    max_sweeps: Option<usize>,
    /// Whether to run a verification sweep after convergence
    verify_fixpoint: bool,
    /// Whether to check the graph structure before seeding facts
    validate_graph: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_sweeps: None,
            verify_fixpoint: cfg!(debug_assertions),
            validate_graph: true,
        }
    }
}

impl SolverConfig {
    /// Get a new, default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The sweep bound, if any
    #[inline(always)]
    #[must_use]
    pub const fn max_sweeps(&self) -> Option<usize> {
        self.max_sweeps
    }

    /// Whether a verification sweep follows convergence
    #[inline(always)]
    #[must_use]
    pub const fn verify_fixpoint(&self) -> bool {
        self.verify_fixpoint
    }

    /// Whether the graph is checked before the run
    #[inline(always)]
    #[must_use]
    pub const fn validate_graph(&self) -> bool {
        self.validate_graph
    }

    /// Bound the number of sweeps a run may take.
    ///
    /// A monotone analysis always converges, so the bound only matters for clients that may be
    /// broken. A run exceeding it fails with [`Error::NonConvergence`](crate::Error::NonConvergence).
    pub fn set_max_sweeps(&mut self, max: Option<usize>) -> &mut Self {
        self.max_sweeps = max;
        self
    }

    /// Set whether the solver runs one extra sweep after convergence and asserts that it changes
    /// nothing.
    ///
    /// Enabled by default in debug builds.
    pub fn set_verify_fixpoint(&mut self, yes: bool) -> &mut Self {
        self.verify_fixpoint = yes;
        self
    }

    /// Set whether the graph is checked for empty blocks and misplaced or mismatched merge
    /// instructions before the run starts.
    pub fn set_validate_graph(&mut self, yes: bool) -> &mut Self {
        self.validate_graph = yes;
        self
    }
}

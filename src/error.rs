use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Data flow analysis is a pure in-process computation over a trusted program graph, so the
/// taxonomy is deliberately narrow. Only conditions that a caller can reasonably react to are
/// reported here; contract violations by analysis clients (non-monotone operators, out-of-range
/// fact indices) are bugs and surface as panics instead.
///
/// # Error Categories
///
/// ## Program Representation Errors
/// - [`Error::Malformed`] - The function or control flow graph violates a structural invariant
/// - [`Error::UnknownBlock`] - A block handle does not belong to the function being built
/// - [`Error::UnknownValue`] - A value handle does not belong to the function being built
///
/// ## Solver Errors
/// - [`Error::NonConvergence`] - A configured sweep limit was exceeded before a fixpoint
///
/// # Examples
///
/// ```rust
/// use flowscope::{ir::FunctionBuilder, Error};
///
/// let mut builder = FunctionBuilder::new("empty");
/// builder.create_block();
///
/// match builder.build() {
///     Err(Error::Malformed { message, .. }) => println!("rejected: {message}"),
///     Ok(_) => unreachable!("a block without a terminator is malformed"),
///     Err(e) => println!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The program representation is damaged and can not be analyzed.
    ///
    /// Raised for blocks without instructions or without a terminator, instructions appended
    /// after a terminator, merge instructions placed after ordinary instructions, and merge
    /// instructions whose incoming blocks disagree with the block's actual predecessors. The
    /// error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A block index does not refer to a block of the function.
    #[error("Unknown block - bb{0}")]
    UnknownBlock(usize),

    /// A value index does not refer to a value of the function.
    #[error("Unknown value - v{0}")]
    UnknownValue(usize),

    /// The solver did not reach a fixpoint within the configured number of sweeps.
    ///
    /// With monotone operators over a finite lattice this can only happen if the limit is set
    /// lower than the lattice height requires, or if the client operators violate monotonicity.
    #[error("No fixpoint reached after {sweeps} sweeps")]
    NonConvergence {
        /// The number of sweeps performed before giving up
        sweeps: usize,
    },
}

//! Builder error types.

use thiserror::Error;

/// Errors constructing an automaton from a module summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No defined `main`: the start node has nothing to wire to.
    #[error("module defines no `main` function")]
    MissingMain,
    /// A block names a successor index outside its function.
    #[error("block {block} of `{function}` references successor {index} out of range")]
    BadSuccessor {
        function: String,
        block: usize,
        index: usize,
    },
}

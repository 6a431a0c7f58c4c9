//! Setup-time errors that precede any engine attach, so there is no [`crate::Status`]
//! yet to report them through. Everything that happens *after* an engine is
//! constructed is reported as a `Status` instead of an `Error`.

use thiserror::Error;

/// Failure to build a [`crate::graph::StarGraph`] of the requested size.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("requested node count {requested} does not fit in a NodeIndex")]
    TooManyNodes { requested: usize },
    #[error("requested arc count {requested} does not fit in an ArcIndex")]
    TooManyArcs { requested: usize },
}

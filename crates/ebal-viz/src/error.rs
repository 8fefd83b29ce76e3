//! Error types for layout and rendering.

use ebal_core::{BalanceError, FlowKey};
use thiserror::Error;

/// Error type for ordering, composition, axis layout, and rendering.
#[derive(Error, Debug)]
pub enum VizError {
    /// Both or neither of tick distance / tick count were given;
    /// a caller misconfiguration, surfaced immediately
    #[error("exactly one of tick distance or tick count must be given")]
    AmbiguousTickSpec,

    /// A tick distance of zero cannot produce increasing positions
    #[error("tick distance must be positive")]
    ZeroTickDistance,

    /// Axis layout over an empty time index
    #[error("cannot lay out ticks over an empty time index")]
    EmptyIndex,

    /// A resolved flow key has no series in the table
    #[error("flow {0} is not present in the table")]
    MissingSeries(FlowKey),

    /// A flow key reached composition without a color assignment
    #[error("flow {0} has no resolved color")]
    MissingColor(FlowKey),

    /// Unparseable color literal
    #[error("invalid color literal '{0}'")]
    BadColor(String),

    /// Errors bubbled up from partitioning/slicing
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Chart backend failure
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience type alias for Results using VizError.
pub type VizResult<T> = Result<T, VizError>;

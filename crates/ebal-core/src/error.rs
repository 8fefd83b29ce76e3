//! Error types for the balance core.
//!
//! Every operation in this crate fails before producing partial output: a
//! [`BalanceError`] means the caller received nothing, not a half-built
//! table or view.

use thiserror::Error;

use crate::table::{FlowKey, NodeLabel};
use crate::window::TimeWindow;

/// Error type for table construction, partitioning, and slicing.
#[derive(Error, Debug)]
pub enum BalanceError {
    /// No flow in the table touches the requested bus
    #[error("no flows reference bus '{bus}'")]
    EmptyBus { bus: NodeLabel },

    /// A flow with source == target == bus; indicates corrupt upstream data
    #[error("self-loop flow {key}")]
    SelfLoop { key: FlowKey },

    /// Slicing left no samples after clipping to the available index
    #[error("time window {window} selects no samples")]
    EmptyWindow { window: TimeWindow },

    /// A series does not match the table's time index length
    #[error("series {key} has {got} samples, index has {expected}")]
    LengthMismatch {
        key: FlowKey,
        expected: usize,
        got: usize,
    },

    /// Timestamps are not strictly increasing
    #[error("time index is not strictly increasing at position {position}")]
    UnsortedIndex { position: usize },
}

/// Convenience type alias for Results using BalanceError.
pub type CoreResult<T> = Result<T, BalanceError>;

//! Error types for model construction and dispatch.

use ebal_core::{BalanceError, FlowKey, NodeLabel};
use thiserror::Error;

/// Error type for energy-system construction and validation.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Two nodes with the same label
    #[error("duplicate node label '{0}'")]
    DuplicateLabel(NodeLabel),

    /// A flow endpoint that was never added
    #[error("unknown node '{0}'")]
    UnknownNode(NodeLabel),

    /// Two flows between the same pair of nodes
    #[error("duplicate flow {0}")]
    DuplicateFlow(FlowKey),

    /// A fixed profile whose length does not match the horizon
    #[error("profile of {key} has {got} values, horizon has {expected}")]
    ProfileLength {
        key: FlowKey,
        expected: usize,
        got: usize,
    },

    /// A fixed profile needs a nominal value to scale against
    #[error("flow {0} has a profile but no nominal value")]
    ProfileWithoutNominal(FlowKey),

    /// Conversion factors only make sense on transformer outputs
    #[error("flow {0} carries a conversion factor outside a transformer output")]
    ConversionOutsideTransformer(FlowKey),

    /// A transformer output without a conversion factor
    #[error("transformer output {0} has no conversion factor")]
    MissingConversionFactor(FlowKey),

    /// Transformers are modeled with a single input flow
    #[error("transformer '{0}' must have exactly one input flow")]
    TransformerInputs(NodeLabel),

    /// A storage needs one charging and one discharging flow
    #[error("storage '{0}' must have exactly one inflow and one outflow")]
    StorageConnections(NodeLabel),
}

/// Error type for the LP dispatch run.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Zero-length time horizon
    #[error("dispatch horizon is empty")]
    EmptyHorizon,

    /// The system failed validation before the LP was built
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The delegated LP solver could not produce a solution
    #[error("LP solver failed: {0}")]
    Solver(String),

    /// Assembling the results table failed
    #[error(transparent)]
    Table(#[from] BalanceError),
}

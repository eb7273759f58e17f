//! Error types for graph construction, enumeration, and reaction derivation.

use thiserror::Error;

/// Result type alias using [`NetworkError`].
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Everything that can go wrong while building a reaction network.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    /// An edge references a node that was never declared, a node id was
    /// declared twice with different types, or a duplicate edge carries a
    /// conflicting type.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Two species with equal type multisets ended up with different node
    /// counts. Unreachable unless an internal invariant is broken.
    #[error("unsupported composition: {0}")]
    UnsupportedComposition(String),

    /// A caller-supplied size or time budget was exceeded.
    #[error("resource budget exceeded: {0}")]
    ResourceBudgetExceeded(String),

    /// A line of a text graph could not be parsed.
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// No reference graph is registered under the given name.
    #[error("unknown reference graph `{name}` (available: {available})")]
    UnknownReference { name: String, available: String },

    /// The worker pool could not be constructed.
    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl NetworkError {
    pub(crate) fn invalid_graph(msg: impl Into<String>) -> Self {
        Self::InvalidGraph(msg.into())
    }

    pub(crate) fn budget(msg: impl Into<String>) -> Self {
        Self::ResourceBudgetExceeded(msg.into())
    }
}

//! Error types for mine construction and registry administration

use thiserror::Error;

/// Typed failures surfaced to external callers (commands, menus).
///
/// Construction errors reject the invalid object before it exists; registry
/// conflicts are non-fatal and translated into user feedback by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MineError {
    /// A weighted entry was constructed with a negative weight
    #[error("weight cannot be negative: {0}")]
    NegativeWeight(f64),

    /// A layer inside a non-empty layer list had no entries
    #[error("mine layer must contain at least one weighted entry")]
    EmptyLayer,

    /// A layer list must be empty (flat distribution) or hold at least two layers
    #[error("layered mine types need at least two layers")]
    TooFewLayers,

    /// Refill interval of zero ticks would reset the mine every tick forever
    #[error("refill interval must be at least one tick (got {0})")]
    InvalidInterval(u64),

    /// The warning window cannot be longer than the refill interval
    #[error("warning window of {warning} ticks exceeds refill interval of {interval} ticks")]
    WarningExceedsInterval { warning: u64, interval: u64 },

    /// Attempted to register a mine under a name that is already taken
    #[error("a mine named '{0}' already exists")]
    NameTaken(String),

    /// Operation referenced a mine name that is not registered
    #[error("no mine named '{0}'")]
    UnknownMine(String),
}

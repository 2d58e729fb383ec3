//! Error types for the control API.

use thiserror::Error;

use crate::graph::router::LfoTarget;
use crate::params::Param;

/// Result type alias for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// A rejected control call. The voice keeps its previous state and keeps
/// rendering; nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// Input could not be read as a usable number.
    #[error("cannot set {param} from {input:?}: not a usable number")]
    Parse { param: Param, input: String },

    /// Label text that names no known option.
    #[error("unknown {param} {input:?}")]
    UnknownVariant { param: Param, input: String },

    /// The destination is driven by the LFO until the route is detached.
    #[error("{param} is driven by the LFO ({target} route); detach it first")]
    InvalidTransition { param: Param, target: LfoTarget },

    /// The render side has not drained the control queue.
    #[error("control queue full, dropped {param} update")]
    QueueFull { param: Param },
}

//! Error types for the session layer.

use roundkeep_protocol::GameId;

/// Errors that can occur in the session store.
///
/// Round-state updates never fail (unknown games are created on the fly),
/// so these only come out of layout handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given code.
    /// Either it was never created, or it was cleared or reaped.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// A layout request asked for more distinct samples than its range
    /// holds, e.g. 6 open exits out of 5.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

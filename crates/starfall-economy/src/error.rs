//! Error types for the `starfall-economy` crate.

use starfall_types::{BodyId, VoyageId};

/// Errors raised by the resource model and arrival resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// An intermediate value left the representable range.
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// The computation that overflowed.
        operation: &'static str,
    },

    /// Combat against a body with zero defense is undefined.
    #[error("body {body} has zero defense")]
    ZeroDefense {
        /// The defending body.
        body: BodyId,
    },

    /// The voyage is not addressed to the body it was applied to.
    #[error("voyage {voyage} targets {expected}, applied to {actual}")]
    WrongDestination {
        /// The voyage.
        voyage: VoyageId,
        /// Its destination.
        expected: BodyId,
        /// The body it was applied to.
        actual: BodyId,
    },
}

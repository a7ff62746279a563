//! Error types for the `starfall-chain` crate.

use starfall_types::IdError;

/// Errors raised while decoding raw contract records.
///
/// Enumerations never fail to decode (unknown values map to an explicit
/// `Unknown` variant); only identifiers and field-encoded coordinates can.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// An identifier could not be normalized.
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdError),

    /// A field-encoded coordinate does not fit in an `i64`.
    #[error("coordinate out of range: {0}")]
    CoordinateOutOfRange(String),

    /// A canonical identifier could not be converted back to `uint256`.
    #[error("cannot re-encode {value}: {reason}")]
    Reencode {
        /// The identifier.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors returned by a [`GameContract`](crate::contract::GameContract) read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The call reverted.
    #[error("contract call {call} reverted: {reason}")]
    Reverted {
        /// The read that reverted.
        call: &'static str,
        /// Revert reason, if any.
        reason: String,
    },

    /// The read never reached the contract (network, gateway, encoding).
    #[error("contract transport error during {call}: {message}")]
    Transport {
        /// The read that failed.
        call: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A batched read returned a different number of records than requested.
    #[error("{call} returned {actual} records for {expected} ids")]
    BatchMismatch {
        /// The batched read.
        call: &'static str,
        /// Number of ids requested.
        expected: usize,
        /// Number of records returned.
        actual: usize,
    },
}

//! Error types for the auction protocol.

use thiserror::Error;

use crate::capabilities::TransferError;
use zkauction_merkle::MerkleError;

/// Aggregated error type for protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The referenced entity (auction, balance leaf, bid leaf) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A proof failed verification, or a plain sibling path was malformed.
    #[error("invalid proof")]
    InvalidProof,

    /// The proof anchors to a root that has left the history window.
    #[error("proof anchored to a stale root; regenerate against a recent one")]
    StaleRoot,

    /// The operation is not allowed in the auction's current phase.
    #[error("operation not allowed in phase {phase}: {operation}")]
    PhaseViolation {
        phase: &'static str,
        operation: &'static str,
    },

    /// A (identity, nonce) signal was presented twice for the same scope.
    #[error("signal already consumed for this nonce")]
    ReplayedNonce,

    /// The escrowed balance cannot cover the requested amount.
    #[error("insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: u64, amount: u64 },

    /// The auction's proceeds were already distributed.
    #[error("auction already settled")]
    AlreadySettled,

    /// An auction with this id already exists.
    #[error("auction id {0} already registered")]
    DuplicateAuction(u64),

    /// Caller is not allowed to perform this operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The bid being refunded is the presumptive winning reveal.
    #[error("winning bid cannot be refunded")]
    WinningBid,

    /// A balance computation would overflow.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The external asset ledger refused a transfer.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Accumulator-level failure.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),
}

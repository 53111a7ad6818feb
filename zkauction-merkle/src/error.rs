use thiserror::Error;

/// Errors produced by the Merkle accumulator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// The requested depth is outside the supported range.
    #[error("unsupported tree depth {0} (must be 1..=32)")]
    InvalidDepth(usize),

    /// All leaf slots are occupied.
    #[error("merkle tree is full ({capacity} leaves)")]
    TreeFull { capacity: usize },

    /// The index does not name an occupied leaf slot.
    #[error("leaf index {index} out of range (occupied: {occupied})")]
    IndexOutOfRange { index: usize, occupied: usize },
}

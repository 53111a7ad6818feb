//! Incremental Merkle accumulator with a bounded root-history window.
//!
//! The auction protocol keeps three kinds of accumulators (escrow balances,
//! per-auction membership, per-auction bids); all of them are instances of
//! [`MerkleAccumulator`] paired with a [`RootHistory`].

pub mod error;
pub mod history;
pub mod tree;

pub use error::MerkleError;
pub use history::RootHistory;
pub use tree::{compute_root, verify_proof, MerkleAccumulator};

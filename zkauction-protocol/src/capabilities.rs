//! External collaborators consumed through object-safe traits.
//!
//! The protocol never implements proof systems, asset custody, or time; it
//! consumes them through these seams. Production deployments wire in real
//! verifiers and a settlement rail; the fixtures crate wires in native
//! mocks.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use zkauction_common::{Actor, BidStatement, MembershipStatement};

/// Verifier for membership proofs (withdrawals and reveals).
pub trait MembershipVerifier: Send + Sync {
    fn verify(&self, proof: &[u8], statement: &MembershipStatement) -> bool;
}

/// Verifier for sealed-bid proofs.
pub trait BidVerifier: Send + Sync {
    fn verify(&self, proof: &[u8], statement: &BidStatement) -> bool;
}

/// Failure reported by the external asset ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The payer cannot cover the amount.
    #[error("insufficient funds for {actor}")]
    InsufficientFunds { actor: Actor },

    /// The token does not exist or is not held by the sender.
    #[error("token {token_id} not held by {actor}")]
    TokenNotHeld { token_id: u64, actor: Actor },

    /// The ledger refused the transfer for its own reasons.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Fungible and non-fungible transfers on the host ledger.
///
/// Every call is atomic on the ledger's side; a returned error means no
/// value moved.
pub trait AssetLedger: Send + Sync {
    fn transfer(&self, from: Actor, to: Actor, amount: u64) -> Result<(), TransferError>;
    fn transfer_nft(&self, from: Actor, to: Actor, token_id: u64) -> Result<(), TransferError>;
}

/// Source of the protocol's notion of "now" (unix seconds).
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

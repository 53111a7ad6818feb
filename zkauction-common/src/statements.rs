//! Public statements checked by the external proof verifiers.
//!
//! The external circuits are opaque to the protocol: it only ever hands a
//! serialized proof plus one of these fixed-arity statements to a verifier
//! capability and acts on the boolean answer. Each proof kind gets a named
//! record rather than a positional signal tuple.

use serde::{Deserialize, Serialize};

use crate::{serde_fr, serde_fr_vec, Actor, Fr};

/// Statement for the membership proof (withdrawals and reveals).
///
/// Private to the circuit: the identity secrets, the leaf index, and the
/// sibling path. Public: the anchoring root, the replay nonce, the
/// commitment whose leaf is being opened, the leaf data value (claimed
/// balance or revealed bid amount), the receiver the caller binds the proof
/// to, and the per-(identity, nonce) signal output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembershipStatement {
    #[serde(with = "serde_fr")]
    pub root: Fr,
    pub nonce: u64,
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    #[serde(with = "serde_fr")]
    pub leaf_data: Fr,
    pub receiver: Actor,
    #[serde(with = "serde_fr")]
    pub signal: Fr,
}

/// Statement for the bid proof.
///
/// The circuit simultaneously proves auction membership under one of the
/// snapshot roots, ownership of the escrow leaf at `balance_index` under
/// `balance_root`, and that the hidden bid does not exceed the hidden
/// balance. `bid_leaf` and `new_balance_leaf` are opaque circuit outputs;
/// the protocol inserts/updates them without recomputing their preimages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidStatement {
    #[serde(with = "serde_fr_vec")]
    pub membership_roots: Vec<Fr>,
    #[serde(with = "serde_fr")]
    pub balance_root: Fr,
    pub auction_id: u64,
    pub nonce: u64,
    pub balance_index: u64,
    #[serde(with = "serde_fr")]
    pub signal: Fr,
    #[serde(with = "serde_fr")]
    pub bid_leaf: Fr,
    #[serde(with = "serde_fr")]
    pub new_balance_leaf: Fr,
}

/// An opaque proof together with the accumulator root it was anchored to.
///
/// Used where the operation signature carries no sibling path from which the
/// protocol could re-derive the anchor (reveals); the protocol checks the
/// anchor against its root-history window before consulting the verifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofBundle {
    pub proof: Vec<u8>,
    #[serde(with = "serde_fr")]
    pub anchor: Fr,
}

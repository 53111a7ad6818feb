//! Participant identities and leaf encoding.
//!
//! An identity is derived from two private field elements (trapdoor and
//! nullifier); only the commitment ever leaves the participant's process.
//! Leaves bind an opaque data value (balance, auction id, bid amount) to a
//! commitment without revealing the identity from the leaf alone.

use crate::{poseidon_hash, reduce_be_bytes_to_fr, Fr};

/// A participant's private identity and its public commitment.
///
/// ```text
/// secret     = H(nullifier, trapdoor)
/// commitment = H(secret)
/// ```
///
/// The protocol never persists identities; it only ever sees commitments.
#[derive(Clone, Debug)]
pub struct Identity {
    trapdoor: Fr,
    nullifier: Fr,
    secret: Fr,
    commitment: Fr,
}

impl Identity {
    /// Derive an identity from caller-supplied randomness.
    pub fn derive(trapdoor: Fr, nullifier: Fr) -> Self {
        let secret = poseidon_hash(&[nullifier, trapdoor]);
        let commitment = poseidon_hash(&[secret]);
        Self {
            trapdoor,
            nullifier,
            secret,
            commitment,
        }
    }

    /// Expand a 32-byte seed into the two private field elements and derive.
    ///
    /// Uses the blake3 XOF so distinct seeds give independent trapdoor and
    /// nullifier values.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut xof = blake3::Hasher::new().update(seed).finalize_xof();
        let mut wide = [0u8; 64];
        xof.fill(&mut wide);

        let mut trapdoor_bytes = [0u8; 32];
        trapdoor_bytes.copy_from_slice(&wide[..32]);
        let mut nullifier_bytes = [0u8; 32];
        nullifier_bytes.copy_from_slice(&wide[32..]);

        Self::derive(
            reduce_be_bytes_to_fr(&trapdoor_bytes),
            reduce_be_bytes_to_fr(&nullifier_bytes),
        )
    }

    /// The public commitment identifying this participant.
    pub fn commitment(&self) -> Fr {
        self.commitment
    }

    /// Private nullifier, needed by the participant's own prover.
    pub fn nullifier(&self) -> Fr {
        self.nullifier
    }

    /// Private trapdoor, needed by the participant's own prover.
    pub fn trapdoor(&self) -> Fr {
        self.trapdoor
    }

    pub fn secret(&self) -> Fr {
        self.secret
    }

    /// Encode this identity's leaf for a given data value.
    pub fn leaf(&self, data: Fr) -> Fr {
        leaf_for(self.commitment, data)
    }
}

/// `leaf(commitment, data) = H(commitment, data)`.
pub fn leaf_for(commitment: Fr, data: Fr) -> Fr {
    poseidon_hash(&[commitment, data])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = Identity::derive(Fr::from(11u64), Fr::from(22u64));
        let b = Identity::derive(Fr::from(11u64), Fr::from(22u64));
        assert_eq!(a.commitment(), b.commitment());
        assert_eq!(a.secret(), b.secret());
    }

    #[test]
    fn distinct_randomness_gives_distinct_commitments() {
        let a = Identity::derive(Fr::from(1u64), Fr::from(2u64));
        let b = Identity::derive(Fr::from(2u64), Fr::from(1u64));
        assert_ne!(a.commitment(), b.commitment());
    }

    #[test]
    fn seed_expansion_is_deterministic() {
        let a = Identity::from_seed(&[9u8; 32]);
        let b = Identity::from_seed(&[9u8; 32]);
        let c = Identity::from_seed(&[10u8; 32]);
        assert_eq!(a.commitment(), b.commitment());
        assert_ne!(a.commitment(), c.commitment());
    }

    #[test]
    fn leaf_binds_commitment_and_data() {
        let identity = Identity::from_seed(&[1u8; 32]);
        let leaf = identity.leaf(Fr::from(1000u64));
        assert_eq!(leaf, leaf_for(identity.commitment(), Fr::from(1000u64)));
        assert_ne!(leaf, identity.leaf(Fr::from(1001u64)));
    }
}

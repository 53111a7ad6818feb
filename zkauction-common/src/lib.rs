//! Shared primitives for the zkauction protocol.
//!
//! This crate holds everything the protocol crates agree on but that carries
//! no protocol state: the bn256 scalar field used for leaves and roots, the
//! native Poseidon hash (the protocol's external `hash` capability), byte
//! conversions for field elements, the identity/commitment model, and the
//! fixed-arity public statements consumed by the external proof verifiers.

use anyhow::{anyhow, Result};
use halo2curves_axiom::ff::{Field as _, PrimeField};
use poseidon_primitives::poseidon::primitives::{ConstantLength, Hash as PoseidonHash, Spec};
use serde::{Deserialize, Serialize};

pub use halo2curves_axiom::bn256::Fr;

pub mod identity;
pub mod statements;

pub use identity::{leaf_for, Identity};
pub use statements::{BidStatement, MembershipStatement, ProofBundle};

const POSEIDON_T: usize = 6;
const POSEIDON_RATE: usize = 5;
const POSEIDON_FULL_ROUNDS: usize = 8;
const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// Hash a fixed-arity input with the protocol's Poseidon instance.
///
/// All leaf encodings, commitments, and signals in the protocol are built
/// from this single compression function.
pub fn poseidon_hash<const L: usize>(values: &[Fr; L]) -> Fr {
    PoseidonHash::<Fr, ZkPoseidonSpec, ConstantLength<L>, POSEIDON_T, POSEIDON_RATE>::init()
        .hash(*values)
}

#[derive(Debug)]
struct ZkPoseidonSpec;

impl Spec<Fr, POSEIDON_T, POSEIDON_RATE> for ZkPoseidonSpec {
    fn full_rounds() -> usize {
        POSEIDON_FULL_ROUNDS
    }

    fn partial_rounds() -> usize {
        POSEIDON_PARTIAL_ROUNDS
    }

    fn sbox(val: Fr) -> Fr {
        val.pow_vartime([5])
    }

    fn secure_mds() -> usize {
        0
    }
}

pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr> {
    Fr::from_bytes(bytes)
        .into_option()
        .ok_or_else(|| anyhow!("invalid bn256 scalar encoding"))
}

pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    let repr = fr.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    bytes
}

/// Interpret 32 big-endian bytes as a field element, reducing mod the order.
pub fn reduce_be_bytes_to_fr(bytes: &[u8; 32]) -> Fr {
    let mut acc = Fr::zero();
    let base = Fr::from(256);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

pub fn fr_to_u64(fr: &Fr) -> Result<u64> {
    let repr = fr.to_repr();
    let bytes = repr.as_ref();
    anyhow::ensure!(
        bytes[8..].iter().all(|&b| b == 0),
        "field element does not fit in u64"
    );
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    Ok(u64::from_le_bytes(buf))
}

/// Address-only handle for the asset-transfer capabilities.
///
/// An `Actor` identifies a party to the external ledger (depositor, receiver,
/// auction owner, protocol vault). It is never threaded through cryptographic
/// logic; identities bind to commitments, not actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Actor(pub [u8; 32]);

impl Actor {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "…")
    }
}

impl Serialize for Actor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let hex: String = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        serializer.serialize_str(&format!("0x{}", hex))
    }
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hex = s.strip_prefix("0x").unwrap_or(&s);
        if hex.len() != 64 {
            return Err(serde::de::Error::custom(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        decode_hex_to_slice(hex, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Actor(bytes))
    }
}

fn decode_hex_to_slice(hex: &str, out: &mut [u8]) -> std::result::Result<(), String> {
    if hex.len() != out.len() * 2 {
        return Err(format!(
            "hex length {} doesn't match output length {}",
            hex.len(),
            out.len() * 2
        ));
    }
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let hi = (chunk[0] as char)
            .to_digit(16)
            .ok_or_else(|| "invalid hex char".to_string())?;
        let lo = (chunk[1] as char)
            .to_digit(16)
            .ok_or_else(|| "invalid hex char".to_string())?;
        out[i] = ((hi << 4) | lo) as u8;
    }
    Ok(())
}

/// Serde module for a single `Fr` as 0x-prefixed hex (little-endian repr).
pub mod serde_fr {
    use super::*;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(fr: &Fr, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = fr_to_bytes(fr);
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        serializer.serialize_str(&format!("0x{}", hex))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Fr, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FrVisitor;

        impl de::Visitor<'_> for FrVisitor {
            type Value = Fr;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a 32-byte hex string (with or without 0x prefix)")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                let hex = v.strip_prefix("0x").unwrap_or(v);
                if hex.len() != 64 {
                    return Err(E::custom(format!(
                        "expected 64 hex chars, got {}",
                        hex.len()
                    )));
                }
                let mut bytes = [0u8; 32];
                decode_hex_to_slice(hex, &mut bytes).map_err(E::custom)?;
                Fr::from_repr(bytes)
                    .into_option()
                    .ok_or_else(|| E::custom("invalid field element encoding"))
            }
        }

        deserializer.deserialize_str(FrVisitor)
    }
}

/// Serde module for `Vec<Fr>` (each element hex-encoded as in [`serde_fr`]).
pub mod serde_fr_vec {
    use super::*;
    use serde::{ser::SerializeSeq, Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super::serde_fr")] Fr);

    pub fn serialize<S>(values: &Vec<Fr>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for fr in values {
            seq.serialize_element(&Wrapper(*fr))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<Fr>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wrapped: Vec<Wrapper> = Vec::deserialize(deserializer)?;
        Ok(wrapped.into_iter().map(|w| w.0).collect())
    }
}

//! Shared fixtures for protocol tests.
//!
//! Provides deterministic participants, a native mock prover/verifier pair,
//! an in-memory asset ledger, a manually advanced clock, and a `TestWorld`
//! that wires everything into an `AuctionProtocol`.
//!
//! The mock prover performs the circuit's checks natively (Merkle path
//! recomputation, bid-within-balance range check, signal and leaf
//! derivation) and then seals the public statement with a keyed blake3
//! digest; the mock verifiers recompute the seal. A statement the prover
//! would refuse therefore has no valid proof, which is the only soundness
//! property the protocol tests rely on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{ensure, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use zkauction_common::{
    poseidon_hash, Actor, BidStatement, Fr, Identity, MembershipStatement, ProofBundle,
};
use zkauction_merkle::compute_root;
use zkauction_protocol::{
    AssetLedger, AuctionProtocol, BidVerifier, Clock, MembershipVerifier, ProtocolConfig,
    TransferError,
};

const MEMBERSHIP_PROOF_CONTEXT: &str = "zkauction 2024 membership proof";
const BID_PROOF_CONTEXT: &str = "zkauction 2024 bid proof";

// ---- participants ----

/// A test participant: private identity plus an external ledger account.
pub struct TestParticipant {
    pub identity: Identity,
    pub actor: Actor,
    next_nonce: u64,
}

impl TestParticipant {
    pub fn generate(rng: &mut ChaCha8Rng) -> Self {
        let seed: [u8; 32] = rng.gen();
        let actor_bytes: [u8; 32] = rng.gen();
        Self {
            identity: Identity::from_seed(&seed),
            actor: Actor::new(actor_bytes),
            next_nonce: 0,
        }
    }

    pub fn commitment(&self) -> Fr {
        self.identity.commitment()
    }

    /// Monotonic per-participant nonce for proof statements.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }
}

/// Deterministic participants from a scenario seed.
pub fn participants(seed: u64, count: usize) -> Vec<TestParticipant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| TestParticipant::generate(&mut rng)).collect()
}

// ---- mock prover ----

fn seal(context: &str, statement_bytes: &[u8]) -> Vec<u8> {
    blake3::derive_key(context, statement_bytes).to_vec()
}

/// Output of the mock membership prover.
pub struct MembershipProof {
    pub signal: Fr,
    pub proof: Vec<u8>,
    pub anchor: Fr,
}

impl MembershipProof {
    pub fn bundle(&self) -> ProofBundle {
        ProofBundle {
            proof: self.proof.clone(),
            anchor: self.anchor,
        }
    }
}

/// Prove that `leaf(commitment, leaf_data)` sits at `index` under `root`.
///
/// Refuses (as an unsatisfiable circuit would) when the sibling path does
/// not anchor the leaf at the given root.
pub fn prove_membership(
    identity: &Identity,
    nonce: u64,
    leaf_data: u64,
    receiver: Actor,
    index: u64,
    siblings: &[Fr],
    root: Fr,
) -> Result<MembershipProof> {
    let leaf = identity.leaf(Fr::from(leaf_data));
    ensure!(
        compute_root(leaf, index as usize, siblings) == root,
        "leaf path does not anchor at the provided root"
    );

    let signal = poseidon_hash(&[identity.nullifier(), Fr::from(nonce)]);
    let statement = MembershipStatement {
        root,
        nonce,
        commitment: identity.commitment(),
        leaf_data: Fr::from(leaf_data),
        receiver,
        signal,
    };
    let bytes = serde_json::to_vec(&statement).context("serialize membership statement")?;
    Ok(MembershipProof {
        signal,
        proof: seal(MEMBERSHIP_PROOF_CONTEXT, &bytes),
        anchor: root,
    })
}

/// Private witness for the mock bid prover.
pub struct BidWitness<'a> {
    pub auction_id: u64,
    pub nonce: u64,
    pub bid: u64,
    pub balance: u64,
    pub balance_index: u64,
    pub balance_siblings: &'a [Fr],
    pub balance_root: Fr,
    pub membership_index: u64,
    pub membership_siblings: &'a [Fr],
    pub membership_roots: &'a [Fr],
}

/// Output of the mock bid prover: the public circuit outputs plus the proof.
#[derive(Debug)]
pub struct BidProof {
    pub signal: Fr,
    pub bid_leaf: Fr,
    pub new_balance_leaf: Fr,
    pub proof: Vec<u8>,
}

/// Prove a sealed bid: auction membership under one of the snapshot roots,
/// ownership of the escrow balance leaf, and bid ≤ balance.
pub fn prove_bid(identity: &Identity, witness: &BidWitness<'_>) -> Result<BidProof> {
    ensure!(witness.bid <= witness.balance, "bid exceeds escrowed balance");

    let membership_leaf = identity.leaf(Fr::from(witness.auction_id));
    let membership_root = compute_root(
        membership_leaf,
        witness.membership_index as usize,
        witness.membership_siblings,
    );
    let anchored = witness
        .membership_roots
        .iter()
        .any(|root| *root == membership_root);
    ensure!(anchored, "membership path does not anchor at any snapshot root");

    let balance_leaf = identity.leaf(Fr::from(witness.balance));
    ensure!(
        compute_root(
            balance_leaf,
            witness.balance_index as usize,
            witness.balance_siblings
        ) == witness.balance_root,
        "balance path does not anchor at the escrow root"
    );

    let signal = poseidon_hash(&[identity.nullifier(), Fr::from(witness.nonce)]);
    let bid_leaf = identity.leaf(Fr::from(witness.bid));
    let new_balance_leaf = identity.leaf(Fr::from(witness.balance - witness.bid));

    let statement = BidStatement {
        membership_roots: witness.membership_roots.to_vec(),
        balance_root: witness.balance_root,
        auction_id: witness.auction_id,
        nonce: witness.nonce,
        balance_index: witness.balance_index,
        signal,
        bid_leaf,
        new_balance_leaf,
    };
    let bytes = serde_json::to_vec(&statement).context("serialize bid statement")?;
    Ok(BidProof {
        signal,
        bid_leaf,
        new_balance_leaf,
        proof: seal(BID_PROOF_CONTEXT, &bytes),
    })
}

// ---- mock verifiers ----

pub struct MockMembershipVerifier;

impl MembershipVerifier for MockMembershipVerifier {
    fn verify(&self, proof: &[u8], statement: &MembershipStatement) -> bool {
        serde_json::to_vec(statement)
            .map(|bytes| seal(MEMBERSHIP_PROOF_CONTEXT, &bytes) == proof)
            .unwrap_or(false)
    }
}

pub struct MockBidVerifier;

impl BidVerifier for MockBidVerifier {
    fn verify(&self, proof: &[u8], statement: &BidStatement) -> bool {
        serde_json::to_vec(statement)
            .map(|bytes| seal(BID_PROOF_CONTEXT, &bytes) == proof)
            .unwrap_or(false)
    }
}

// ---- in-memory assets ----

#[derive(Default)]
struct AssetsInner {
    balances: HashMap<[u8; 32], u64>,
    tokens: HashMap<u64, [u8; 32]>,
}

/// Fungible + NFT ledger backed by two maps.
#[derive(Default)]
pub struct InMemoryAssets {
    inner: Mutex<AssetsInner>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, actor: Actor, amount: u64) {
        let mut inner = self.inner.lock().expect("assets lock poisoned");
        *inner.balances.entry(actor.0).or_insert(0) += amount;
    }

    pub fn mint_nft(&self, actor: Actor, token_id: u64) {
        let mut inner = self.inner.lock().expect("assets lock poisoned");
        inner.tokens.insert(token_id, actor.0);
    }

    pub fn balance_of(&self, actor: Actor) -> u64 {
        let inner = self.inner.lock().expect("assets lock poisoned");
        inner.balances.get(&actor.0).copied().unwrap_or(0)
    }

    pub fn owner_of(&self, token_id: u64) -> Option<Actor> {
        let inner = self.inner.lock().expect("assets lock poisoned");
        inner.tokens.get(&token_id).map(|bytes| Actor::new(*bytes))
    }
}

impl AssetLedger for InMemoryAssets {
    fn transfer(&self, from: Actor, to: Actor, amount: u64) -> Result<(), TransferError> {
        let mut inner = self.inner.lock().expect("assets lock poisoned");
        let from_balance = inner.balances.get(&from.0).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TransferError::InsufficientFunds { actor: from });
        }
        inner.balances.insert(from.0, from_balance - amount);
        *inner.balances.entry(to.0).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_nft(&self, from: Actor, to: Actor, token_id: u64) -> Result<(), TransferError> {
        let mut inner = self.inner.lock().expect("assets lock poisoned");
        match inner.tokens.get(&token_id) {
            Some(owner) if *owner == from.0 => {
                inner.tokens.insert(token_id, to.0);
                Ok(())
            }
            _ => Err(TransferError::TokenNotHeld {
                token_id,
                actor: from,
            }),
        }
    }
}

// ---- manual clock ----

/// Clock advanced explicitly by the test.
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ---- wired world ----

/// An `AuctionProtocol` wired with mocks, plus handles to drive them.
pub struct TestWorld {
    pub protocol: AuctionProtocol,
    pub assets: Arc<InMemoryAssets>,
    pub clock: Arc<ManualClock>,
    pub vault: Actor,
}

impl TestWorld {
    pub fn new(config: ProtocolConfig) -> Self {
        let assets = Arc::new(InMemoryAssets::new());
        let clock = Arc::new(ManualClock::new(0));
        let vault = Actor::new([0xee; 32]);
        let protocol = AuctionProtocol::new(
            config,
            vault,
            Arc::new(MockMembershipVerifier),
            Arc::new(MockBidVerifier),
            assets.clone(),
            clock.clone(),
        )
        .expect("default protocol configuration is valid");
        Self {
            protocol,
            assets,
            clock,
            vault,
        }
    }

    /// Small trees and short phases; enough for every scenario test.
    pub fn quick() -> Self {
        Self::new(ProtocolConfig {
            tree_depth: 8,
            root_history_window: 4,
            enrollment_period: 100,
            bidding_period: 100,
            reveal_period: 100,
        })
    }
}

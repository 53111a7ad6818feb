//! Auction registry and lifecycle state machine.
//!
//! Phases are derived from the clock, never stored: an auction is Enrolling
//! until `bidding_start`, Bidding until `reveal_start`, Revealing until
//! `complete_at`, and Complete afterwards. Auctions are insert-only; a
//! settled auction stays queryable.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use zkauction_common::{fr_to_bytes, serde_fr, Actor, Fr};
use zkauction_merkle::{MerkleAccumulator, RootHistory};

use crate::error::ProtocolError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Enrolling,
    Bidding,
    Revealing,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Enrolling => "enrolling",
            Phase::Bidding => "bidding",
            Phase::Revealing => "revealing",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bid opened during the reveal phase, in reveal order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealedBid {
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    pub amount: u64,
    pub receiver: Actor,
}

/// Per-auction state: schedule, accumulators, reveals, signal sets.
#[derive(Clone, Debug)]
pub struct AuctionState {
    pub id: u64,
    pub owner: Actor,
    pub token_id: u64,
    pub duration: u64,
    pub bidding_start: u64,
    pub reveal_start: u64,
    pub complete_at: u64,
    pub membership_tree: MerkleAccumulator,
    pub membership_history: RootHistory,
    pub bid_tree: MerkleAccumulator,
    pub bid_history: RootHistory,
    pub reveals: Vec<RevealedBid>,
    pub settled: bool,
    bid_signals: HashSet<[u8; 32]>,
    reveal_signals: HashSet<[u8; 32]>,
}

impl AuctionState {
    pub fn phase(&self, now: u64) -> Phase {
        if now < self.bidding_start {
            Phase::Enrolling
        } else if now < self.reveal_start {
            Phase::Bidding
        } else if now < self.complete_at {
            Phase::Revealing
        } else {
            Phase::Complete
        }
    }

    pub fn require_phase(
        &self,
        now: u64,
        expected: Phase,
        operation: &'static str,
    ) -> Result<(), ProtocolError> {
        let phase = self.phase(now);
        if phase != expected {
            return Err(ProtocolError::PhaseViolation {
                phase: phase.as_str(),
                operation,
            });
        }
        Ok(())
    }

    pub fn bid_signal_consumed(&self, signal: &Fr) -> bool {
        self.bid_signals.contains(&fr_to_bytes(signal))
    }

    pub fn consume_bid_signal(&mut self, signal: Fr) {
        self.bid_signals.insert(fr_to_bytes(&signal));
    }

    pub fn reveal_signal_consumed(&self, signal: &Fr) -> bool {
        self.reveal_signals.contains(&fr_to_bytes(signal))
    }

    pub fn consume_reveal_signal(&mut self, signal: Fr) {
        self.reveal_signals.insert(fr_to_bytes(&signal));
    }
}

/// Owned map of all auctions, keyed by caller-chosen id.
#[derive(Clone, Debug, Default)]
pub struct AuctionRegistry {
    auctions: HashMap<u64, AuctionState>,
}

pub struct AuctionSchedule {
    pub bidding_start: u64,
    pub reveal_start: u64,
    pub complete_at: u64,
}

impl AuctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        id: u64,
        owner: Actor,
        duration: u64,
        token_id: u64,
        schedule: AuctionSchedule,
        tree_depth: usize,
        window: usize,
    ) -> Result<&AuctionState, ProtocolError> {
        if self.auctions.contains_key(&id) {
            return Err(ProtocolError::DuplicateAuction(id));
        }

        let membership_tree = MerkleAccumulator::new(tree_depth)?;
        let membership_history = RootHistory::new(window, membership_tree.root());
        let bid_tree = MerkleAccumulator::new(tree_depth)?;
        let bid_history = RootHistory::new(window, bid_tree.root());

        let state = AuctionState {
            id,
            owner,
            token_id,
            duration,
            bidding_start: schedule.bidding_start,
            reveal_start: schedule.reveal_start,
            complete_at: schedule.complete_at,
            membership_tree,
            membership_history,
            bid_tree,
            bid_history,
            reveals: Vec::new(),
            settled: false,
            bid_signals: HashSet::new(),
            reveal_signals: HashSet::new(),
        };
        Ok(self.auctions.entry(id).or_insert(state))
    }

    pub fn get(&self, id: u64) -> Result<&AuctionState, ProtocolError> {
        self.auctions
            .get(&id)
            .ok_or_else(|| ProtocolError::NotFound(format!("auction {id}")))
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut AuctionState, ProtocolError> {
        self.auctions
            .get_mut(&id)
            .ok_or_else(|| ProtocolError::NotFound(format!("auction {id}")))
    }

    pub fn len(&self) -> usize {
        self.auctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }
}

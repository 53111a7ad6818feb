//! Emitted records.
//!
//! Every accepted state transition appends one record to the protocol's
//! event log and returns it to the caller. Field order is part of the wire
//! contract and must not be rearranged.

use serde::{Deserialize, Serialize};

use zkauction_common::{serde_fr, Actor, Fr};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuctionCreated {
    pub auction_id: u64,
    pub owner: Actor,
    pub duration: u64,
    pub token_id: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    pub previous_balance: u64,
    pub amount: u64,
    pub index: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Withdraw {
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    pub claimed_balance: u64,
    pub amount: u64,
    pub index: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub auction_id: u64,
    #[serde(with = "serde_fr")]
    pub signal: Fr,
    pub bid_index: u64,
    #[serde(with = "serde_fr")]
    pub bid_leaf: Fr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    pub auction_id: u64,
    #[serde(with = "serde_fr")]
    pub signal: Fr,
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    pub bid_amount: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub auction_id: u64,
    #[serde(with = "serde_fr")]
    pub commitment: Fr,
    pub bid_amount: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distribute {
    pub auction_id: u64,
    pub token_id: u64,
    pub winner: Actor,
    pub amount: u64,
}

/// Ordered union of every record kind, as stored in the event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AuctionEvent {
    AuctionCreated(AuctionCreated),
    Deposit(Deposit),
    Withdraw(Withdraw),
    Bid(Bid),
    Reveal(Reveal),
    Refund(Refund),
    Distribute(Distribute),
}

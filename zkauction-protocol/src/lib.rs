//! Privacy-preserving sealed-bid auction protocol.
//!
//! Participants escrow funds against an identity commitment, enroll in
//! auctions, place sealed bids backed by zero-knowledge proofs, reveal
//! during a dedicated phase, and settle. All protocol state lives in Merkle
//! accumulators with a bounded root-history window so proofs generated
//! off-band stay valid for a few mutations.
//!
//! External collaborators (proof verifiers, asset ledger, clock) are
//! consumed through the traits in [`capabilities`].

pub mod capabilities;
pub mod config;
pub mod error;
pub mod escrow;
pub mod events;
pub mod protocol;
pub mod registry;
pub mod settlement;

pub use capabilities::{
    AssetLedger, BidVerifier, Clock, MembershipVerifier, SystemClock, TransferError,
};
pub use config::ProtocolConfig;
pub use error::ProtocolError;
pub use events::{
    AuctionCreated, AuctionEvent, Bid, Deposit, Distribute, Refund, Reveal, Withdraw,
};
pub use protocol::AuctionProtocol;
pub use registry::{Phase, RevealedBid};

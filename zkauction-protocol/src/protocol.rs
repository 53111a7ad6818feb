//! Protocol facade.
//!
//! `AuctionProtocol` owns all state (escrow ledger, auction registry, event
//! log) and the four external capabilities. Every public operation is
//! atomic: all fallible checks and external transfers happen before the
//! first accumulator mutation, so a returned error always leaves state
//! unchanged.

use std::sync::Arc;

use tracing::{debug, info};

use zkauction_common::{leaf_for, Actor, BidStatement, Fr, MembershipStatement, ProofBundle};
use zkauction_merkle::{compute_root, MerkleError};

use crate::capabilities::{AssetLedger, BidVerifier, Clock, MembershipVerifier};
use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::escrow::EscrowLedger;
use crate::events::{
    AuctionCreated, AuctionEvent, Bid, Deposit, Distribute, Refund, Reveal, Withdraw,
};
use crate::registry::{AuctionRegistry, AuctionSchedule, Phase, RevealedBid};
use crate::settlement::select_winner;

pub struct AuctionProtocol {
    config: ProtocolConfig,
    escrow: EscrowLedger,
    registry: AuctionRegistry,
    membership_verifier: Arc<dyn MembershipVerifier>,
    bid_verifier: Arc<dyn BidVerifier>,
    assets: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
    /// Account holding all escrowed funds on the external ledger.
    vault: Actor,
    events: Vec<AuctionEvent>,
}

impl AuctionProtocol {
    pub fn new(
        config: ProtocolConfig,
        vault: Actor,
        membership_verifier: Arc<dyn MembershipVerifier>,
        bid_verifier: Arc<dyn BidVerifier>,
        assets: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ProtocolError> {
        let escrow = EscrowLedger::new(config.tree_depth, config.root_history_window)?;
        Ok(Self {
            config,
            escrow,
            registry: AuctionRegistry::new(),
            membership_verifier,
            bid_verifier,
            assets,
            clock,
            vault,
            events: Vec::new(),
        })
    }

    // ---- auction lifecycle ----

    pub fn create_auction(
        &mut self,
        auction_id: u64,
        owner: Actor,
        duration: u64,
        token_id: u64,
    ) -> Result<AuctionCreated, ProtocolError> {
        let now = self.clock.now();
        let bidding_start = now + self.config.enrollment_period;
        let reveal_start = bidding_start + self.config.bidding_period;
        let complete_at = reveal_start + self.config.reveal_period;
        self.registry.create(
            auction_id,
            owner,
            duration,
            token_id,
            AuctionSchedule {
                bidding_start,
                reveal_start,
                complete_at,
            },
            self.config.tree_depth,
            self.config.root_history_window,
        )?;

        info!(auction_id, token_id, bidding_start, complete_at, "auction created");
        let record = AuctionCreated {
            auction_id,
            owner,
            duration,
            token_id,
        };
        self.events.push(AuctionEvent::AuctionCreated(record.clone()));
        Ok(record)
    }

    /// Enroll a commitment into an auction's membership accumulator.
    ///
    /// Owner-gated and valid only before bidding opens. Returns the leaf
    /// index; the member needs it to build bid proofs.
    pub fn add_member(
        &mut self,
        auction_id: u64,
        caller: Actor,
        commitment: Fr,
    ) -> Result<usize, ProtocolError> {
        let now = self.clock.now();
        let auction = self.registry.get_mut(auction_id)?;
        if caller != auction.owner {
            return Err(ProtocolError::Unauthorized(
                "only the auction owner can enroll members".into(),
            ));
        }
        auction.require_phase(now, Phase::Enrolling, "add_member")?;

        let leaf = leaf_for(commitment, Fr::from(auction_id));
        let index = auction.membership_tree.insert(leaf)?;
        auction
            .membership_history
            .record(auction.membership_tree.root());
        debug!(auction_id, index, "member enrolled");
        Ok(index)
    }

    // ---- escrow ----

    /// First deposit for a commitment: inserts a fresh balance leaf.
    pub fn deposit(
        &mut self,
        depositor: Actor,
        commitment: Fr,
        amount: u64,
    ) -> Result<Deposit, ProtocolError> {
        if self.escrow.index_of(&commitment).is_some() {
            return Err(ProtocolError::Unauthorized(
                "commitment already has a balance leaf; deposit against it instead".into(),
            ));
        }
        if self.escrow.is_full() {
            return Err(MerkleError::TreeFull {
                capacity: 1usize << self.escrow.depth(),
            }
            .into());
        }

        self.assets.transfer(depositor, self.vault, amount)?;
        let index = self.escrow.register(commitment, amount)?;

        debug!(index, amount, "fresh deposit");
        let record = Deposit {
            commitment,
            previous_balance: 0,
            amount,
            index: index as u64,
        };
        self.events.push(AuctionEvent::Deposit(record.clone()));
        Ok(record)
    }

    /// Deposit on top of an existing balance leaf.
    ///
    /// The caller states the current balance and proves the live leaf
    /// against the current escrow root with a plain sibling path; no ZK
    /// proof is involved because nothing private is spent.
    pub fn deposit_existing(
        &mut self,
        depositor: Actor,
        commitment: Fr,
        current_balance: u64,
        amount: u64,
        siblings: &[Fr],
    ) -> Result<Deposit, ProtocolError> {
        let (index, leaf) = self.escrow.require_live_balance(&commitment, current_balance)?;
        if siblings.len() != self.escrow.depth()
            || compute_root(leaf, index, siblings) != self.escrow.root()
        {
            return Err(ProtocolError::InvalidProof);
        }
        let new_balance = current_balance
            .checked_add(amount)
            .ok_or(ProtocolError::ArithmeticOverflow)?;

        self.assets.transfer(depositor, self.vault, amount)?;
        self.escrow
            .set_leaf(index, leaf_for(commitment, Fr::from(new_balance)))?;

        debug!(index, amount, new_balance, "existing deposit");
        let record = Deposit {
            commitment,
            previous_balance: current_balance,
            amount,
            index: index as u64,
        };
        self.events.push(AuctionEvent::Deposit(record.clone()));
        Ok(record)
    }

    /// Withdraw part of an escrowed balance to a receiver.
    ///
    /// The membership proof may anchor to any escrow root still inside the
    /// history window; the claimed balance must match the live leaf.
    #[allow(clippy::too_many_arguments)]
    pub fn withdraw(
        &mut self,
        nonce: u64,
        claimed_balance: u64,
        amount: u64,
        receiver: Actor,
        commitment: Fr,
        signal: Fr,
        siblings: &[Fr],
        proof: &[u8],
    ) -> Result<Withdraw, ProtocolError> {
        let (index, leaf) = self.escrow.require_live_balance(&commitment, claimed_balance)?;
        if amount > claimed_balance {
            return Err(ProtocolError::InsufficientBalance {
                balance: claimed_balance,
                amount,
            });
        }
        if siblings.len() != self.escrow.depth() {
            return Err(ProtocolError::InvalidProof);
        }
        let anchor = compute_root(leaf, index, siblings);
        if !self.escrow.history().contains(&anchor) {
            return Err(ProtocolError::StaleRoot);
        }
        if self.escrow.signal_consumed(&signal) {
            return Err(ProtocolError::ReplayedNonce);
        }
        let statement = MembershipStatement {
            root: anchor,
            nonce,
            commitment,
            leaf_data: Fr::from(claimed_balance),
            receiver,
            signal,
        };
        if !self.membership_verifier.verify(proof, &statement) {
            return Err(ProtocolError::InvalidProof);
        }

        self.assets.transfer(self.vault, receiver, amount)?;
        self.escrow
            .set_leaf(index, leaf_for(commitment, Fr::from(claimed_balance - amount)))?;
        self.escrow.consume_signal(signal);

        debug!(index, amount, "withdrawal");
        let record = Withdraw {
            commitment,
            claimed_balance,
            amount,
            index: index as u64,
        };
        self.events.push(AuctionEvent::Withdraw(record.clone()));
        Ok(record)
    }

    // ---- bidding ----

    /// Place a sealed bid.
    ///
    /// `bid_leaf` and `new_balance_leaf` are opaque circuit outputs; the
    /// protocol inserts and applies them on the verifier's word without
    /// recomputing their preimages. The balance path must anchor at the
    /// current escrow root; membership may anchor at any in-window snapshot
    /// root.
    #[allow(clippy::too_many_arguments)]
    pub fn bid(
        &mut self,
        auction_id: u64,
        nonce: u64,
        balance_index: u64,
        signal: Fr,
        balance_leaf: Fr,
        bid_leaf: Fr,
        new_balance_leaf: Fr,
        balance_siblings: &[Fr],
        root_snapshot: &[Fr],
        proof: &[u8],
    ) -> Result<Bid, ProtocolError> {
        let now = self.clock.now();
        let depth = self.escrow.depth();
        let escrow_root = self.escrow.root();

        let auction = self.registry.get_mut(auction_id)?;
        auction.require_phase(now, Phase::Bidding, "bid")?;
        for root in root_snapshot {
            if !auction.membership_history.contains(root) {
                return Err(ProtocolError::StaleRoot);
            }
        }

        let index = usize::try_from(balance_index)
            .map_err(|_| ProtocolError::NotFound("balance index out of range".into()))?;
        let stored = self.escrow.leaf_at(index)?;
        if stored != balance_leaf {
            return Err(ProtocolError::NotFound(
                "balance leaf does not match the live leaf".into(),
            ));
        }
        if balance_siblings.len() != depth {
            return Err(ProtocolError::InvalidProof);
        }
        if compute_root(balance_leaf, index, balance_siblings) != escrow_root {
            return Err(ProtocolError::StaleRoot);
        }
        if auction.bid_signal_consumed(&signal) {
            return Err(ProtocolError::ReplayedNonce);
        }
        let statement = BidStatement {
            membership_roots: root_snapshot.to_vec(),
            balance_root: escrow_root,
            auction_id,
            nonce,
            balance_index,
            signal,
            bid_leaf,
            new_balance_leaf,
        };
        if !self.bid_verifier.verify(proof, &statement) {
            return Err(ProtocolError::InvalidProof);
        }

        let bid_index = auction.bid_tree.insert(bid_leaf)?;
        auction.bid_history.record(auction.bid_tree.root());
        auction.consume_bid_signal(signal);
        self.escrow.set_leaf(index, new_balance_leaf)?;

        debug!(auction_id, bid_index, "sealed bid accepted");
        let record = Bid {
            auction_id,
            signal,
            bid_index: bid_index as u64,
            bid_leaf,
        };
        self.events.push(AuctionEvent::Bid(record.clone()));
        Ok(record)
    }

    // ---- reveal ----

    /// Open a sealed bid during the reveal phase.
    ///
    /// The proof shows `leaf(commitment, bid_amount)` sits in the auction's
    /// bid accumulator under the bundled anchor, which must still be inside
    /// the bid tree's history window.
    pub fn reveal(
        &mut self,
        auction_id: u64,
        nonce: u64,
        bid_amount: u64,
        receiver: Actor,
        commitment: Fr,
        signal: Fr,
        bundle: &ProofBundle,
    ) -> Result<Reveal, ProtocolError> {
        let now = self.clock.now();
        let auction = self.registry.get_mut(auction_id)?;
        auction.require_phase(now, Phase::Revealing, "reveal")?;
        if !auction.bid_history.contains(&bundle.anchor) {
            return Err(ProtocolError::StaleRoot);
        }
        if auction.reveal_signal_consumed(&signal) {
            return Err(ProtocolError::ReplayedNonce);
        }
        let statement = MembershipStatement {
            root: bundle.anchor,
            nonce,
            commitment,
            leaf_data: Fr::from(bid_amount),
            receiver,
            signal,
        };
        if !self.membership_verifier.verify(&bundle.proof, &statement) {
            return Err(ProtocolError::InvalidProof);
        }

        auction.reveals.push(RevealedBid {
            commitment,
            amount: bid_amount,
            receiver,
        });
        auction.consume_reveal_signal(signal);

        debug!(auction_id, bid_amount, "bid revealed");
        let record = Reveal {
            auction_id,
            signal,
            commitment,
            bid_amount,
        };
        self.events.push(AuctionEvent::Reveal(record.clone()));
        Ok(record)
    }

    // ---- settlement ----

    /// Return a losing bid's amount to the bidder's escrow balance.
    ///
    /// No prior reveal is required; the bid leaf is opened by content. The
    /// refunded leaf is zeroed, so a second refund fails the content check.
    /// The presumptive winning reveal cannot be refunded.
    #[allow(clippy::too_many_arguments)]
    pub fn refund(
        &mut self,
        auction_id: u64,
        bid_amount: u64,
        commitment: Fr,
        bid_index: u64,
        bid_siblings: &[Fr],
        claimed_balance: u64,
        balance_siblings: &[Fr],
    ) -> Result<Refund, ProtocolError> {
        let now = self.clock.now();
        let depth = self.escrow.depth();
        let escrow_root = self.escrow.root();

        let auction = self.registry.get_mut(auction_id)?;
        auction.require_phase(now, Phase::Complete, "refund")?;
        let (balance_index, balance_leaf) =
            self.escrow.require_live_balance(&commitment, claimed_balance)?;

        let index = usize::try_from(bid_index)
            .map_err(|_| ProtocolError::NotFound("bid index out of range".into()))?;
        let expected = leaf_for(commitment, Fr::from(bid_amount));
        let stored = auction.bid_tree.leaf_at(index)?;
        if stored != expected {
            return Err(ProtocolError::NotFound(
                "bid leaf does not match the live leaf".into(),
            ));
        }
        if bid_siblings.len() != auction.bid_tree.depth()
            || compute_root(expected, index, bid_siblings) != auction.bid_tree.root()
        {
            return Err(ProtocolError::InvalidProof);
        }
        if let Some((_, winner)) = select_winner(&auction.reveals) {
            if winner.commitment == commitment && winner.amount == bid_amount {
                return Err(ProtocolError::WinningBid);
            }
        }
        if balance_siblings.len() != depth
            || compute_root(balance_leaf, balance_index, balance_siblings) != escrow_root
        {
            return Err(ProtocolError::InvalidProof);
        }
        let new_balance = claimed_balance
            .checked_add(bid_amount)
            .ok_or(ProtocolError::ArithmeticOverflow)?;

        auction
            .bid_tree
            .update(index, leaf_for(commitment, Fr::from(0u64)))?;
        auction.bid_history.record(auction.bid_tree.root());
        self.escrow
            .set_leaf(balance_index, leaf_for(commitment, Fr::from(new_balance)))?;

        debug!(auction_id, bid_amount, "bid refunded");
        let record = Refund {
            auction_id,
            commitment,
            bid_amount,
        };
        self.events.push(AuctionEvent::Refund(record.clone()));
        Ok(record)
    }

    /// Settle the auction: NFT to the winner's receiver, proceeds to the
    /// owner. Exactly once per auction.
    pub fn distribute(&mut self, auction_id: u64) -> Result<Distribute, ProtocolError> {
        let now = self.clock.now();
        let auction = self.registry.get_mut(auction_id)?;
        auction.require_phase(now, Phase::Complete, "distribute")?;
        if auction.settled {
            return Err(ProtocolError::AlreadySettled);
        }
        let (_, winner) = select_winner(&auction.reveals)
            .ok_or_else(|| ProtocolError::NotFound("no revealed bids".into()))?;
        let receiver = winner.receiver;
        let amount = winner.amount;
        let owner = auction.owner;
        let token_id = auction.token_id;

        // `settled` flips only after both transfer legs land; a failed
        // transfer leaves the auction open so settlement can be retried.
        self.assets.transfer_nft(owner, receiver, token_id)?;
        self.assets.transfer(self.vault, owner, amount)?;
        auction.settled = true;

        info!(auction_id, token_id, amount, "auction settled");
        let record = Distribute {
            auction_id,
            token_id,
            winner: receiver,
            amount,
        };
        self.events.push(AuctionEvent::Distribute(record.clone()));
        Ok(record)
    }

    // ---- queries ----

    pub fn merkle_tree_root(&self, auction_id: u64) -> Result<Fr, ProtocolError> {
        Ok(self.registry.get(auction_id)?.membership_tree.root())
    }

    /// In-window membership roots, oldest first.
    pub fn merkle_tree_history(&self, auction_id: u64) -> Result<Vec<Fr>, ProtocolError> {
        Ok(self.registry.get(auction_id)?.membership_history.snapshot())
    }

    pub fn bid_tree_root(&self, auction_id: u64) -> Result<Fr, ProtocolError> {
        Ok(self.registry.get(auction_id)?.bid_tree.root())
    }

    pub fn bid_tree_history(&self, auction_id: u64) -> Result<Vec<Fr>, ProtocolError> {
        Ok(self.registry.get(auction_id)?.bid_history.snapshot())
    }

    pub fn membership_proof(
        &self,
        auction_id: u64,
        index: usize,
    ) -> Result<Vec<Fr>, ProtocolError> {
        Ok(self.registry.get(auction_id)?.membership_tree.create_proof(index)?)
    }

    pub fn bid_proof(&self, auction_id: u64, index: usize) -> Result<Vec<Fr>, ProtocolError> {
        Ok(self.registry.get(auction_id)?.bid_tree.create_proof(index)?)
    }

    pub fn start_timestamp(&self, auction_id: u64) -> Result<u64, ProtocolError> {
        Ok(self.registry.get(auction_id)?.bidding_start)
    }

    pub fn reveal_timestamp(&self, auction_id: u64) -> Result<u64, ProtocolError> {
        Ok(self.registry.get(auction_id)?.reveal_start)
    }

    pub fn complete_timestamp(&self, auction_id: u64) -> Result<u64, ProtocolError> {
        Ok(self.registry.get(auction_id)?.complete_at)
    }

    pub fn phase(&self, auction_id: u64) -> Result<Phase, ProtocolError> {
        Ok(self.registry.get(auction_id)?.phase(self.clock.now()))
    }

    pub fn escrow_root(&self) -> Fr {
        self.escrow.root()
    }

    /// In-window escrow roots, oldest first.
    pub fn escrow_history(&self) -> Vec<Fr> {
        self.escrow.history().snapshot()
    }

    pub fn escrow_index_of(&self, commitment: &Fr) -> Option<u64> {
        self.escrow.index_of(commitment).map(|i| i as u64)
    }

    /// Sibling path for a commitment's balance leaf under the current root.
    pub fn escrow_proof(&self, commitment: &Fr) -> Result<(u64, Vec<Fr>), ProtocolError> {
        let index = self
            .escrow
            .index_of(commitment)
            .ok_or_else(|| ProtocolError::NotFound("no balance leaf for commitment".into()))?;
        Ok((index as u64, self.escrow.create_proof(index)?))
    }

    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    struct AcceptAll;
    impl MembershipVerifier for AcceptAll {
        fn verify(&self, _proof: &[u8], _statement: &MembershipStatement) -> bool {
            true
        }
    }
    impl BidVerifier for AcceptAll {
        fn verify(&self, _proof: &[u8], _statement: &BidStatement) -> bool {
            true
        }
    }

    struct FreeAssets;
    impl AssetLedger for FreeAssets {
        fn transfer(&self, _from: Actor, _to: Actor, _amount: u64) -> Result<(), crate::capabilities::TransferError> {
            Ok(())
        }
        fn transfer_nft(&self, _from: Actor, _to: Actor, _token_id: u64) -> Result<(), crate::capabilities::TransferError> {
            Ok(())
        }
    }

    struct FlakyAssets {
        fail_transfers: AtomicBool,
    }
    impl AssetLedger for FlakyAssets {
        fn transfer(&self, _from: Actor, _to: Actor, _amount: u64) -> Result<(), crate::capabilities::TransferError> {
            if self.fail_transfers.load(Ordering::SeqCst) {
                return Err(crate::capabilities::TransferError::Rejected(
                    "ledger offline".into(),
                ));
            }
            Ok(())
        }
        fn transfer_nft(&self, _from: Actor, _to: Actor, _token_id: u64) -> Result<(), crate::capabilities::TransferError> {
            Ok(())
        }
    }

    struct TestClock(AtomicU64);
    impl Clock for TestClock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn protocol() -> (AuctionProtocol, Arc<TestClock>) {
        let clock = Arc::new(TestClock(AtomicU64::new(0)));
        let protocol = AuctionProtocol::new(
            ProtocolConfig {
                tree_depth: 8,
                root_history_window: 4,
                enrollment_period: 100,
                bidding_period: 100,
                reveal_period: 100,
            },
            Actor::new([0xffu8; 32]),
            Arc::new(AcceptAll),
            Arc::new(AcceptAll),
            Arc::new(FreeAssets),
            clock.clone(),
        )
        .unwrap();
        (protocol, clock)
    }

    #[test]
    fn create_auction_schedules_phases_from_config() {
        let (mut protocol, clock) = protocol();
        let record = protocol
            .create_auction(1, Actor::new([1u8; 32]), 600, 7)
            .unwrap();
        assert_eq!(record.auction_id, 1);
        assert_eq!(protocol.start_timestamp(1).unwrap(), 100);
        assert_eq!(protocol.reveal_timestamp(1).unwrap(), 200);
        assert_eq!(protocol.complete_timestamp(1).unwrap(), 300);
        assert_eq!(protocol.phase(1).unwrap(), Phase::Enrolling);

        clock.0.store(250, Ordering::SeqCst);
        assert_eq!(protocol.phase(1).unwrap(), Phase::Revealing);
    }

    #[test]
    fn duplicate_auction_id_is_rejected() {
        let (mut protocol, _) = protocol();
        protocol.create_auction(1, Actor::new([1u8; 32]), 600, 7).unwrap();
        assert!(matches!(
            protocol.create_auction(1, Actor::new([2u8; 32]), 600, 8),
            Err(ProtocolError::DuplicateAuction(1))
        ));
    }

    #[test]
    fn add_member_is_owner_gated_and_phase_gated() {
        let (mut protocol, clock) = protocol();
        let owner = Actor::new([1u8; 32]);
        protocol.create_auction(1, owner, 600, 7).unwrap();

        assert!(matches!(
            protocol.add_member(1, Actor::new([2u8; 32]), Fr::from(5u64)),
            Err(ProtocolError::Unauthorized(_))
        ));
        assert_eq!(protocol.add_member(1, owner, Fr::from(5u64)).unwrap(), 0);

        clock.0.store(150, Ordering::SeqCst);
        assert!(matches!(
            protocol.add_member(1, owner, Fr::from(6u64)),
            Err(ProtocolError::PhaseViolation { operation: "add_member", .. })
        ));
    }

    #[test]
    fn fresh_deposit_rejects_registered_commitment() {
        let (mut protocol, _) = protocol();
        let depositor = Actor::new([2u8; 32]);
        let commitment = Fr::from(42u64);
        let record = protocol.deposit(depositor, commitment, 1000).unwrap();
        assert_eq!(record.previous_balance, 0);
        assert_eq!(record.index, 0);
        assert!(matches!(
            protocol.deposit(depositor, commitment, 10),
            Err(ProtocolError::Unauthorized(_))
        ));
    }

    #[test]
    fn distribute_requires_reveals_and_completion() {
        let (mut protocol, clock) = protocol();
        protocol.create_auction(1, Actor::new([1u8; 32]), 600, 7).unwrap();

        assert!(matches!(
            protocol.distribute(1),
            Err(ProtocolError::PhaseViolation { operation: "distribute", .. })
        ));

        clock.0.store(301, Ordering::SeqCst);
        assert!(matches!(
            protocol.distribute(1),
            Err(ProtocolError::NotFound(_))
        ));
    }

    #[test]
    fn failed_settlement_transfer_leaves_the_auction_open() {
        let clock = Arc::new(TestClock(AtomicU64::new(0)));
        let assets = Arc::new(FlakyAssets {
            fail_transfers: AtomicBool::new(false),
        });
        let mut protocol = AuctionProtocol::new(
            ProtocolConfig {
                tree_depth: 8,
                root_history_window: 4,
                enrollment_period: 100,
                bidding_period: 100,
                reveal_period: 100,
            },
            Actor::new([0xffu8; 32]),
            Arc::new(AcceptAll),
            Arc::new(AcceptAll),
            assets.clone(),
            clock.clone(),
        )
        .unwrap();
        protocol.create_auction(1, Actor::new([1u8; 32]), 600, 7).unwrap();

        clock.0.store(250, Ordering::SeqCst);
        let anchor = protocol.bid_tree_root(1).unwrap();
        protocol
            .reveal(
                1,
                0,
                800,
                Actor::new([2u8; 32]),
                Fr::from(5u64),
                Fr::from(9u64),
                &ProofBundle { proof: vec![1], anchor },
            )
            .unwrap();

        clock.0.store(301, Ordering::SeqCst);
        assets.fail_transfers.store(true, Ordering::SeqCst);
        assert!(matches!(
            protocol.distribute(1),
            Err(ProtocolError::Transfer(_))
        ));

        // Unsettled after the failure; the payout can be retried.
        assets.fail_transfers.store(false, Ordering::SeqCst);
        let record = protocol.distribute(1).unwrap();
        assert_eq!(record.amount, 800);
        assert!(matches!(
            protocol.distribute(1),
            Err(ProtocolError::AlreadySettled)
        ));
    }

    #[test]
    fn events_accumulate_in_order() {
        let (mut protocol, _) = protocol();
        protocol.create_auction(1, Actor::new([1u8; 32]), 600, 7).unwrap();
        protocol.deposit(Actor::new([2u8; 32]), Fr::from(9u64), 50).unwrap();
        let events = protocol.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AuctionEvent::AuctionCreated(_)));
        assert!(matches!(events[1], AuctionEvent::Deposit(_)));
    }
}

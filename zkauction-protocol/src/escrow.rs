//! Escrow balance ledger.
//!
//! One accumulator holds every participant's balance leaf. The ledger keeps
//! a commitment-to-index registry so each commitment has at most one live
//! leaf; a fully withdrawn balance stays in place as `leaf(commitment, 0)`.
//! Asset movement is the facade's job; this module only maintains tree
//! state and the withdrawal signal set.

use std::collections::{HashMap, HashSet};

use zkauction_common::{fr_to_bytes, leaf_for, Fr};
use zkauction_merkle::{MerkleAccumulator, MerkleError, RootHistory};

use crate::error::ProtocolError;

#[derive(Clone, Debug)]
pub struct EscrowLedger {
    tree: MerkleAccumulator,
    history: RootHistory,
    accounts: HashMap<[u8; 32], usize>,
    consumed_signals: HashSet<[u8; 32]>,
}

impl EscrowLedger {
    pub fn new(depth: usize, window: usize) -> Result<Self, MerkleError> {
        let tree = MerkleAccumulator::new(depth)?;
        let history = RootHistory::new(window, tree.root());
        Ok(Self {
            tree,
            history,
            accounts: HashMap::new(),
            consumed_signals: HashSet::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    pub fn history(&self) -> &RootHistory {
        &self.history
    }

    pub fn is_full(&self) -> bool {
        self.tree.len() == self.tree.capacity()
    }

    pub fn index_of(&self, commitment: &Fr) -> Option<usize> {
        self.accounts.get(&fr_to_bytes(commitment)).copied()
    }

    pub fn leaf_at(&self, index: usize) -> Result<Fr, ProtocolError> {
        Ok(self.tree.leaf_at(index)?)
    }

    /// Sibling path for the leaf at `index` under the current root.
    pub fn create_proof(&self, index: usize) -> Result<Vec<Fr>, ProtocolError> {
        Ok(self.tree.create_proof(index)?)
    }

    /// Insert the first balance leaf for a commitment.
    pub fn register(&mut self, commitment: Fr, amount: u64) -> Result<usize, ProtocolError> {
        let key = fr_to_bytes(&commitment);
        if self.accounts.contains_key(&key) {
            return Err(ProtocolError::Unauthorized(
                "commitment already has a balance leaf; deposit against it instead".into(),
            ));
        }
        let index = self.tree.insert(leaf_for(commitment, Fr::from(amount)))?;
        self.history.record(self.tree.root());
        self.accounts.insert(key, index);
        Ok(index)
    }

    /// Locate a commitment's leaf and check it opens to `balance`.
    ///
    /// The root-history window only relaxes proof anchoring; the claimed
    /// balance must always match the leaf stored right now, otherwise a
    /// window-aged proof could resurrect an already-spent balance.
    pub fn require_live_balance(
        &self,
        commitment: &Fr,
        balance: u64,
    ) -> Result<(usize, Fr), ProtocolError> {
        let index = self
            .index_of(commitment)
            .ok_or_else(|| ProtocolError::NotFound("no balance leaf for commitment".into()))?;
        let expected = leaf_for(*commitment, Fr::from(balance));
        let stored = self.leaf_at(index)?;
        if stored != expected {
            return Err(ProtocolError::NotFound(
                "claimed balance does not match the live leaf".into(),
            ));
        }
        Ok((index, expected))
    }

    /// Replace the leaf at an occupied index with an already-encoded leaf.
    pub fn set_leaf(&mut self, index: usize, leaf: Fr) -> Result<(), ProtocolError> {
        self.tree.update(index, leaf)?;
        self.history.record(self.tree.root());
        Ok(())
    }

    pub fn signal_consumed(&self, signal: &Fr) -> bool {
        self.consumed_signals.contains(&fr_to_bytes(signal))
    }

    pub fn consume_signal(&mut self, signal: Fr) {
        self.consumed_signals.insert(fr_to_bytes(&signal));
    }
}

//! Protocol configuration.

use serde::{Deserialize, Serialize};

/// Tunable parameters shared by every accumulator and auction.
///
/// Phase boundaries for a new auction are fixed at creation time from the
/// configured periods; changing the configuration afterwards does not move
/// already-scheduled auctions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Depth of every Merkle accumulator (escrow, membership, bids).
    pub tree_depth: usize,
    /// Number of recent roots accepted when anchoring proofs.
    pub root_history_window: usize,
    /// Seconds between auction creation and the start of bidding.
    pub enrollment_period: u64,
    /// Seconds the bidding phase stays open.
    pub bidding_period: u64,
    /// Seconds the reveal phase stays open.
    pub reveal_period: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            tree_depth: 20,
            root_history_window: 10,
            enrollment_period: 60,
            bidding_period: 300,
            reveal_period: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_json() {
        let config = ProtocolConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ProtocolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tree_depth, 20);
        assert_eq!(back.root_history_window, 10);
    }
}

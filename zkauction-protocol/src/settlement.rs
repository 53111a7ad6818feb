//! Winner selection.

use crate::registry::RevealedBid;

/// Pick the presumptive winner from the reveal record.
///
/// Highest revealed amount wins; on equal amounts the earlier reveal wins,
/// so the selection is stable under later equal-amount reveals. Returns
/// `None` when nothing was revealed.
pub fn select_winner(reveals: &[RevealedBid]) -> Option<(usize, &RevealedBid)> {
    let mut best: Option<(usize, &RevealedBid)> = None;
    for (index, reveal) in reveals.iter().enumerate() {
        match best {
            Some((_, current)) if reveal.amount <= current.amount => {}
            _ => best = Some((index, reveal)),
        }
    }
    best
}

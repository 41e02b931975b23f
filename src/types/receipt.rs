//! Match receipt summarizing one clearing run on one event.
//!
//! The receipt is SSZ-encodable and carries the SHA-256 state root of the
//! event's order book after the run, so two runs can be compared without
//! walking both books.

use ssz_rs::prelude::*;

/// Execution receipt for a single `run_match` call.
///
/// Clearing odds use `0` for "unset" because SSZ has no optional basic
/// type; valid odds are always greater than 1.0.
///
/// ## Example
///
/// ```
/// use backlay::types::MatchReceipt;
///
/// let receipt = MatchReceipt {
///     event_id: 1,
///     matched_lay: 1,
///     unmatched_back: 2,
///     unmatched_lay: 1,
///     matched_lay_stake: 800_000_000,
///     bettor_odds: 200_000_000,
///     layer_odds: 210_000_000,
///     ..Default::default()
/// };
/// assert!(receipt.is_cleared());
/// assert_eq!(receipt.matched_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MatchReceipt {
    pub event_id: u64,

    pub matched_back: u64,
    pub unmatched_back: u64,
    pub matched_lay: u64,
    pub unmatched_lay: u64,

    /// Total matched stake per side (fixed-point)
    pub matched_back_stake: u64,
    pub matched_lay_stake: u64,

    /// Clearing odds (fixed-point), `0` when unset
    pub bettor_odds: u64,
    pub layer_odds: u64,

    /// SHA-256 of the order book after the run
    pub state_root: [u8; 32],
}

impl MatchReceipt {
    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Whether the run produced clearing odds
    pub fn is_cleared(&self) -> bool {
        self.bettor_odds != 0 && self.layer_odds != 0
    }

    pub fn matched_count(&self) -> u64 {
        self.matched_back + self.matched_lay
    }

    pub fn order_count(&self) -> u64 {
        self.matched_back + self.unmatched_back + self.matched_lay + self.unmatched_lay
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_state_root_hex() {
        let receipt = MatchReceipt {
            state_root: [0xAB; 32],
            ..Default::default()
        };

        let hex = receipt.state_root_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("abab"));
    }

    #[test]
    fn test_receipt_uncleared() {
        let receipt = MatchReceipt {
            event_id: 3,
            unmatched_back: 1,
            ..Default::default()
        };
        assert!(!receipt.is_cleared());
        assert_eq!(receipt.order_count(), 1);
        assert_eq!(receipt.matched_count(), 0);
    }

    #[test]
    fn test_receipt_ssz_roundtrip() {
        let receipt = MatchReceipt {
            event_id: 1,
            matched_back: 2,
            unmatched_back: 1,
            matched_lay: 1,
            unmatched_lay: 3,
            matched_back_stake: 1_500_000_000,
            matched_lay_stake: 800_000_000,
            bettor_odds: 220_000_000,
            layer_odds: 210_000_000,
            state_root: [7u8; 32],
        };

        let bytes = ssz_rs::serialize(&receipt).expect("Failed to serialize");
        // 9 * 8 + 32
        assert_eq!(bytes.len(), 104);

        let decoded: MatchReceipt = ssz_rs::deserialize(&bytes).expect("Failed to deserialize");
        assert_eq!(receipt, decoded);
    }
}
